//! Infrastructure layer.

pub mod clock;
pub mod database;
pub mod storage;

pub use self::{
    clock::Clock,
    database::{Database, InMemory},
    storage::Storage,
};
