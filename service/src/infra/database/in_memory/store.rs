//! Backing store of the [`InMemory`] database.
//!
//! [`InMemory`]: super::InMemory

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::domain::{
    contract, customer, damage, protocol, reservation, transaction, vehicle,
    Contract, Customer, FinancialTransaction, HandoverProtocol, Reservation,
    Vehicle,
};

/// Complete dataset of the [`InMemory`] database.
///
/// [`InMemory`]: super::InMemory
#[derive(Clone, Debug, Default)]
pub(crate) struct State {
    /// Stored [`Vehicle`]s.
    pub(crate) vehicles: HashMap<vehicle::Id, Vehicle>,

    /// Stored [`Customer`]s.
    pub(crate) customers: HashMap<customer::Id, Customer>,

    /// Stored [`Reservation`]s.
    pub(crate) reservations: HashMap<reservation::Id, Reservation>,

    /// Stored [`Contract`]s.
    pub(crate) contracts: HashMap<contract::Id, Contract>,

    /// Stored [`HandoverProtocol`]s.
    pub(crate) protocols: HashMap<protocol::Id, HandoverProtocol>,

    /// Stored [`FinancialTransaction`]s.
    pub(crate) transactions: HashMap<transaction::Id, FinancialTransaction>,

    /// Stored [`VehicleDamage`]s.
    ///
    /// [`VehicleDamage`]: crate::domain::VehicleDamage
    pub(crate) damages: HashMap<damage::Id, crate::domain::VehicleDamage>,
}

/// Shared backing store of the [`InMemory`] database.
///
/// [`InMemory`]: super::InMemory
#[derive(Debug, Default)]
pub(crate) struct Store {
    /// Published [`State`] visible to non-transactional reads.
    state: RwLock<State>,

    /// Global writer permit serializing transactions.
    permit: Arc<Mutex<()>>,

    /// Advisory per-[`Vehicle`] locks.
    vehicle_locks: Mutex<HashMap<vehicle::Id, Arc<Mutex<()>>>>,
}

impl Store {
    /// Runs the provided closure over the published [`State`].
    pub(crate) async fn view<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        f(&*self.state.read().await)
    }

    /// Runs the provided closure over the published [`State`] mutably.
    ///
    /// Non-transactional writes apply immediately.
    pub(crate) async fn apply<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> R {
        f(&mut *self.state.write().await)
    }

    /// Begins a new transaction: acquires the global writer permit and
    /// snapshots the published [`State`].
    pub(crate) async fn begin(&self) -> (OwnedMutexGuard<()>, State) {
        let permit = Arc::clone(&self.permit).lock_owned().await;
        let snapshot = self.state.read().await.clone();
        (permit, snapshot)
    }

    /// Returns the advisory lock of the [`Vehicle`] with the provided ID.
    ///
    /// [`Vehicle`]: crate::domain::Vehicle
    pub(crate) async fn vehicle_lock(
        &self,
        id: vehicle::Id,
    ) -> Arc<Mutex<()>> {
        Arc::clone(
            self.vehicle_locks
                .lock()
                .await
                .entry(id)
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Publishes the provided [`State`] as the new visible dataset.
    pub(crate) async fn publish(&self, state: State) {
        *self.state.write().await = state;
    }
}
