//! [`Contract`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::reservation;

/// Rental contract drafted for a [`Reservation`] upon its approval.
///
/// [`Reservation`]: crate::domain::Reservation
#[derive(Clone, Debug)]
pub struct Contract {
    /// ID of this [`Contract`].
    pub id: Id,

    /// ID of the [`Reservation`] this [`Contract`] covers.
    ///
    /// [`Reservation`]: crate::domain::Reservation
    pub reservation_id: reservation::Id,

    /// Rendered [`Text`] of this [`Contract`].
    ///
    /// Contains the signature placeholder until signed at vehicle handover.
    pub text: Text,

    /// [`DateTime`] when this [`Contract`] was drafted.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Contract`] was signed, if it was.
    pub signed_at: Option<SigningDateTime>,
}

impl Contract {
    /// Indicates whether this [`Contract`] has been signed.
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.signed_at.is_some()
    }
}

/// ID of a [`Contract`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
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
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Rendered text of a [`Contract`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Text(String);

impl Text {
    /// Creates a new [`Text`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        (!text.is_empty()).then_some(Self(text))
    }
}

impl FromStr for Text {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Text`")
    }
}

/// [`DateTime`] when a [`Contract`] was drafted.
pub type CreationDateTime = DateTimeOf<(Contract, unit::Creation)>;

/// [`DateTime`] when a [`Contract`] was signed.
pub type SigningDateTime = DateTimeOf<(Contract, unit::Signing)>;
