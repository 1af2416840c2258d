//! [`VehicleDamage`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{vehicle, VehicleDamage},
    infra::{database, Database},
};

use super::super::{client::Access, InMemory};

impl<C: Access> Database<Select<By<Vec<VehicleDamage>, vehicle::Id>>>
    for InMemory<C>
{
    type Ok = Vec<VehicleDamage>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<VehicleDamage>, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let vehicle_id = by.into_inner();
        self.0
            .view(move |state| {
                let mut damages = state
                    .damages
                    .values()
                    .filter(|d| d.vehicle_id == vehicle_id)
                    .cloned()
                    .collect::<Vec<_>>();
                damages.sort_by_key(|d| d.reported_at);
                damages
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<VehicleDamage>> for InMemory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(damage): Insert<VehicleDamage>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .apply(move |state| {
                _ = state.damages.insert(damage.id, damage);
            })
            .await
            .map_err(tracerr::wrap!())
    }
}
