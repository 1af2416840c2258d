//! [`Contract`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{reservation, Contract},
    infra::{database, Database},
};

use super::super::{client::Access, InMemory};

impl<C: Access> Database<Select<By<Option<Contract>, reservation::Id>>>
    for InMemory<C>
{
    type Ok = Option<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Contract>, reservation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let reservation_id = by.into_inner();
        self.0
            .view(move |state| {
                state
                    .contracts
                    .values()
                    .find(|c| c.reservation_id == reservation_id)
                    .cloned()
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<Contract>> for InMemory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(contract): Insert<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .apply(move |state| {
                _ = state.contracts.insert(contract.id, contract);
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Update<Contract>> for InMemory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(contract): Update<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .apply(move |state| {
                _ = state.contracts.insert(contract.id, contract);
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Delete<By<Contract, reservation::Id>>>
    for InMemory<C>
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Contract, reservation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let reservation_id = by.into_inner();
        self.0
            .apply(move |state| {
                state.contracts.retain(|_, c| {
                    c.reservation_id != reservation_id
                });
            })
            .await
            .map_err(tracerr::wrap!())
    }
}
