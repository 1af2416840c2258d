//! In-memory [`Database`] implementation.
//!
//! The whole dataset lives in a single [`store::State`] behind a lock.
//! Transactions stage a copy of the [`store::State`] and publish it on
//! [`Commit`], so a failed command leaves the dataset untouched. A global
//! writer permit serializes transactions, and [`Lock`]s on vehicles are
//! advisory on top of that.
//!
//! [`Commit`]: common::operations::Commit
//! [`Lock`]: common::operations::Lock

pub mod client;
mod impls;
pub(crate) mod store;

use std::sync::Arc;

use derive_more::{Deref, Display, Error as StdError};

#[cfg(doc)]
use crate::infra::Database;

pub use self::client::{NonTx, Tx};

/// In-memory [`Database`] client.
#[derive(Clone, Debug, Deref)]
pub struct InMemory<T = NonTx>(T);

impl InMemory {
    /// Creates a new empty [`InMemory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self(NonTx::new(Arc::new(store::Store::default())))
    }
}

impl Default for InMemory {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory database [`Error`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Transaction was used after being committed.
    #[display("transaction is already closed")]
    TxClosed,
}
