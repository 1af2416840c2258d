//! [`NonTx`] client definitions.

use std::sync::Arc;

use tracerr::Traced;

use crate::infra::database::{self, in_memory::store::State};

use super::{super::store::Store, Access};

/// Non-transactional in-memory database client.
///
/// Writes apply to the published dataset immediately.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// Backing [`Store`] of this client.
    pub(crate) store: Arc<Store>,
}

impl NonTx {
    /// Creates a new [`NonTx`] client over the provided [`Store`].
    pub(crate) fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

impl Access for NonTx {
    async fn view<R>(
        &self,
        f: impl FnOnce(&State) -> R + Send,
    ) -> Result<R, Traced<database::Error>> {
        Ok(self.store.view(f).await)
    }

    async fn apply<R>(
        &self,
        f: impl FnOnce(&mut State) -> R + Send,
    ) -> Result<R, Traced<database::Error>> {
        Ok(self.store.apply(f).await)
    }
}
