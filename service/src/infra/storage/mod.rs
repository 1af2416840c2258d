//! [`Storage`]-related implementations.

pub mod in_memory;

use derive_more::{Display, Error as StdError};

pub use self::in_memory::ImageStore;

/// File storage operation.
pub use common::Handler as Storage;

/// [`Storage`] error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Uploaded image contains no bytes.
    #[display("uploaded image is empty")]
    EmptyImage,
}
