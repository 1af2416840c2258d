//! [`Database`] implementations.

mod contract;
mod customer;
mod damage;
mod protocol;
mod reservation;
mod transaction;
mod vehicle;

use std::sync::Arc;

use common::operations::{By, Commit, Lock, Transact};
use tracerr::Traced;

use crate::{
    domain::{vehicle::Id as VehicleId, Vehicle},
    infra::{database, Database},
};

use super::{InMemory, NonTx, Tx};

impl Database<Transact> for InMemory<NonTx> {
    type Ok = InMemory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(InMemory(Tx::begin(Arc::clone(&self.0.store)).await))
    }
}

impl Database<Transact> for InMemory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Lock<By<Vehicle, VehicleId>>> for InMemory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Vehicle, VehicleId>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .lock_vehicle(by.into_inner())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl Database<Commit> for InMemory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.0.commit().await.map_err(tracerr::wrap!())
    }
}
