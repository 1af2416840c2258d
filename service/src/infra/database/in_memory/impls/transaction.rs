//! [`FinancialTransaction`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{reservation, FinancialTransaction},
    infra::{database, Database},
};

use super::super::{client::Access, InMemory};

impl<C: Access>
    Database<Select<By<Vec<FinancialTransaction>, reservation::Id>>>
    for InMemory<C>
{
    type Ok = Vec<FinancialTransaction>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<FinancialTransaction>, reservation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let reservation_id = by.into_inner();
        self.0
            .view(move |state| {
                let mut entries = state
                    .transactions
                    .values()
                    .filter(|t| t.reservation_id == Some(reservation_id))
                    .cloned()
                    .collect::<Vec<_>>();
                entries.sort_by_key(|t| t.date);
                entries
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<FinancialTransaction>> for InMemory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(entry): Insert<FinancialTransaction>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .apply(move |state| {
                _ = state.transactions.insert(entry.id, entry);
            })
            .await
            .map_err(tracerr::wrap!())
    }
}
