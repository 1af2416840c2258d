//! In-memory database client definitions.

pub mod non_tx;
pub mod tx;

use tracerr::Traced;

use crate::infra::database;

use super::store::State;

pub use self::{non_tx::NonTx, tx::Tx};

/// Access to the dataset of a database client.
///
/// [`NonTx`] reads and writes the published [`State`] directly, while [`Tx`]
/// works over its staged copy.
pub(crate) trait Access {
    /// Runs the provided closure over the dataset.
    async fn view<R>(
        &self,
        f: impl FnOnce(&State) -> R + Send,
    ) -> Result<R, Traced<database::Error>>;

    /// Runs the provided closure over the dataset mutably.
    async fn apply<R>(
        &self,
        f: impl FnOnce(&mut State) -> R + Send,
    ) -> Result<R, Traced<database::Error>>;
}
