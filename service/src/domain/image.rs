//! Stored image definitions.

use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Durable reference to an image persisted in the external file storage.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Ref(Uuid);

impl Ref {
    /// Creates a new random [`Ref`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Ref {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw image bytes to be handed to the file storage.
#[derive(AsRef, Clone, Debug, Eq, From, Into, PartialEq)]
#[as_ref([u8])]
pub struct Bytes(Vec<u8>);

impl Bytes {
    /// Creates new image [`Bytes`] from the given buffer.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Indicates whether this buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Upload of raw image [`Bytes`] to the file storage.
#[derive(Clone, Debug)]
pub struct Upload(pub Bytes);
