//! [`Customer`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{customer, Customer},
    infra::{database, Database},
};

use super::super::{client::Access, InMemory};

impl<C: Access> Database<Select<By<Option<Customer>, customer::Id>>>
    for InMemory<C>
{
    type Ok = Option<Customer>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Customer>, customer::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .view(move |state| state.customers.get(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<Customer>> for InMemory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(customer): Insert<Customer>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .apply(move |state| {
                _ = state.customers.insert(customer.id, customer);
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Update<Customer>> for InMemory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(customer): Update<Customer>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .apply(move |state| {
                _ = state.customers.insert(customer.id, customer);
            })
            .await
            .map_err(tracerr::wrap!())
    }
}
