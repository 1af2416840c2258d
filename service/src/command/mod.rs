//! [`Command`] definition.

pub mod activate_reservation;
pub mod approve_reservation;
pub mod complete_reservation;
pub mod create_portal_reservation;
pub mod create_reservation;
pub mod reject_reservation;
pub mod submit_customer_details;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    activate_reservation::ActivateReservation,
    approve_reservation::ApproveReservation,
    complete_reservation::CompleteReservation,
    create_portal_reservation::CreatePortalReservation,
    create_reservation::CreateReservation,
    reject_reservation::RejectReservation,
    submit_customer_details::SubmitCustomerDetails,
};
