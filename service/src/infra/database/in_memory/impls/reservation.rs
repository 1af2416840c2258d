//! [`Reservation`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{
        reservation::{self, portal},
        vehicle, Reservation,
    },
    infra::{database, Database},
    read::reservation::Open,
};

use super::super::{client::Access, InMemory};

impl<C: Access> Database<Select<By<Option<Reservation>, reservation::Id>>>
    for InMemory<C>
{
    type Ok = Option<Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Reservation>, reservation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .view(move |state| state.reservations.get(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<Option<Reservation>, portal::Token>>>
    for InMemory<C>
{
    type Ok = Option<Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Reservation>, portal::Token>>,
    ) -> Result<Self::Ok, Self::Err> {
        let token = by.into_inner();
        self.0
            .view(move |state| {
                state
                    .reservations
                    .values()
                    .find(|r| r.portal_token.as_ref() == Some(&token))
                    .cloned()
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<Vec<Open<Reservation>>, vehicle::Id>>>
    for InMemory<C>
{
    type Ok = Vec<Open<Reservation>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Open<Reservation>>, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let vehicle_id = by.into_inner();
        self.0
            .view(move |state| {
                let mut open = state
                    .reservations
                    .values()
                    .filter(|r| r.vehicle_id == vehicle_id && r.is_open())
                    .cloned()
                    .collect::<Vec<_>>();
                open.sort_by_key(|r| r.period.start());
                open.into_iter().map(Open).collect()
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<Reservation>> for InMemory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(reservation): Insert<Reservation>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .apply(move |state| {
                _ = state.reservations.insert(reservation.id, reservation);
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Update<Reservation>> for InMemory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(reservation): Update<Reservation>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .apply(move |state| {
                _ = state.reservations.insert(reservation.id, reservation);
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Delete<By<Reservation, reservation::Id>>>
    for InMemory<C>
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Reservation, reservation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .apply(move |state| {
                _ = state.reservations.remove(&id);
            })
            .await
            .map_err(tracerr::wrap!())
    }
}
