//! [`HandoverProtocol`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{reservation, HandoverProtocol},
    infra::{database, Database},
};

use super::super::{client::Access, InMemory};

impl<C: Access>
    Database<Select<By<Vec<HandoverProtocol>, reservation::Id>>>
    for InMemory<C>
{
    type Ok = Vec<HandoverProtocol>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<HandoverProtocol>, reservation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let reservation_id = by.into_inner();
        self.0
            .view(move |state| {
                let mut protocols = state
                    .protocols
                    .values()
                    .filter(|p| p.reservation_id == reservation_id)
                    .cloned()
                    .collect::<Vec<_>>();
                protocols.sort_by_key(|p| p.created_at);
                protocols
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<HandoverProtocol>> for InMemory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(protocol): Insert<HandoverProtocol>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .apply(move |state| {
                _ = state.protocols.insert(protocol.id, protocol);
            })
            .await
            .map_err(tracerr::wrap!())
    }
}
