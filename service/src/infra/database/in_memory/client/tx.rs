//! [`Tx`] client definitions.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use derive_more::Debug;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracerr::Traced;

use crate::{
    domain::vehicle,
    infra::database::{self, in_memory, in_memory::store::State},
};

use super::{super::store::Store, Access};

/// Transactional in-memory database client.
///
/// Holds the global writer permit for its whole lifetime, so transactions are
/// serialized. All reads and writes go through a staged copy of the dataset,
/// which becomes visible only on [`commit()`].
///
/// [`commit()`]: Tx::commit
#[derive(Clone, Debug)]
pub struct Tx {
    /// Inner representation of this client.
    inner: Arc<Inner>,
}

/// Inner representation of the [`Tx`] client.
#[derive(Debug)]
struct Inner {
    /// Backing [`Store`] to publish the staged [`State`] into.
    store: Arc<Store>,

    /// Global writer permit held until this transaction is dropped.
    #[debug(skip)]
    _permit: OwnedMutexGuard<()>,

    /// Staged copy of the dataset.
    staged: RwLock<State>,

    /// Advisory [`Vehicle`] locks held by this transaction.
    ///
    /// [`Vehicle`]: crate::domain::Vehicle
    #[debug(skip)]
    locks: Mutex<HashMap<vehicle::Id, OwnedMutexGuard<()>>>,

    /// Indicator whether this transaction has been committed.
    closed: AtomicBool,
}

impl Tx {
    /// Begins a new [`Tx`] over the provided [`Store`].
    ///
    /// Awaits the global writer permit, so blocks while another transaction
    /// is in flight.
    pub(crate) async fn begin(store: Arc<Store>) -> Self {
        let (permit, snapshot) = store.begin().await;
        Self {
            inner: Arc::new(Inner {
                store,
                _permit: permit,
                staged: RwLock::new(snapshot),
                locks: Mutex::new(HashMap::new()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Errors if this [`Tx`] has been committed already.
    fn ensure_open(&self) -> Result<(), Traced<database::Error>> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(tracerr::new!(database::Error::InMemory(
                in_memory::Error::TxClosed
            )));
        }
        Ok(())
    }

    /// Acquires the advisory lock of the [`Vehicle`] with the provided ID.
    ///
    /// Re-locking a [`Vehicle`] already held by this [`Tx`] is a no-op.
    ///
    /// # Errors
    ///
    /// If this [`Tx`] has been committed already.
    ///
    /// [`Vehicle`]: crate::domain::Vehicle
    pub(crate) async fn lock_vehicle(
        &self,
        id: vehicle::Id,
    ) -> Result<(), Traced<database::Error>> {
        self.ensure_open().map_err(tracerr::wrap!())?;

        let mut locks = self.inner.locks.lock().await;
        if locks.contains_key(&id) {
            return Ok(());
        }
        let lock = self.inner.store.vehicle_lock(id).await;
        let guard = lock.lock_owned().await;
        _ = locks.insert(id, guard);
        Ok(())
    }

    /// Commits this [`Tx`], publishing its staged [`State`] and releasing
    /// all held locks.
    ///
    /// # Errors
    ///
    /// If this [`Tx`] has been committed already.
    pub(crate) async fn commit(&self) -> Result<(), Traced<database::Error>> {
        self.ensure_open().map_err(tracerr::wrap!())?;
        self.inner.closed.store(true, Ordering::SeqCst);

        let staged = self.inner.staged.read().await.clone();
        self.inner.store.publish(staged).await;
        self.inner.locks.lock().await.clear();
        Ok(())
    }
}

impl Access for Tx {
    async fn view<R>(
        &self,
        f: impl FnOnce(&State) -> R + Send,
    ) -> Result<R, Traced<database::Error>> {
        self.ensure_open().map_err(tracerr::wrap!())?;
        Ok(f(&*self.inner.staged.read().await))
    }

    async fn apply<R>(
        &self,
        f: impl FnOnce(&mut State) -> R + Send,
    ) -> Result<R, Traced<database::Error>> {
        self.ensure_open().map_err(tracerr::wrap!())?;
        Ok(f(&mut *self.inner.staged.write().await))
    }
}
