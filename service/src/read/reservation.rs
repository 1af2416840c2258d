//! [`Reservation`] read model definition.

#[cfg(doc)]
use crate::domain::Reservation;

/// Wrapper around [`Reservation`] indicating that it [`is_open()`].
///
/// [`is_open()`]: Reservation::is_open
#[derive(Clone, Debug)]
pub struct Open<T>(pub T);
