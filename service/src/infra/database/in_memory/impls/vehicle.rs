//! [`Vehicle`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{vehicle, Vehicle},
    infra::{database, Database},
};

use super::super::{client::Access, InMemory};

impl<C: Access> Database<Select<By<Option<Vehicle>, vehicle::Id>>>
    for InMemory<C>
{
    type Ok = Option<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Vehicle>, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .view(move |state| state.vehicles.get(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<Vehicle>> for InMemory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(vehicle): Insert<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .apply(move |state| {
                _ = state.vehicles.insert(vehicle.id, vehicle);
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Update<Vehicle>> for InMemory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(vehicle): Update<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .apply(move |state| {
                _ = state.vehicles.insert(vehicle.id, vehicle);
            })
            .await
            .map_err(tracerr::wrap!())
    }
}
