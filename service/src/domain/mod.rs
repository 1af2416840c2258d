//! Domain entities of the rental service.

pub mod contract;
pub mod customer;
pub mod damage;
pub mod image;
pub mod protocol;
pub mod reservation;
pub mod transaction;
pub mod vehicle;

pub use self::{
    contract::Contract, customer::Customer, damage::VehicleDamage,
    protocol::HandoverProtocol, reservation::Reservation,
    transaction::FinancialTransaction, vehicle::Vehicle,
};
