//! [`HandoverProtocol`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{image, reservation, vehicle::Mileage};
#[cfg(doc)]
use crate::domain::{Reservation, Vehicle};

/// Signed record of a [`Vehicle`] handover at rental start or end.
#[derive(Clone, Debug)]
pub struct HandoverProtocol {
    /// ID of this [`HandoverProtocol`].
    pub id: Id,

    /// ID of the [`Reservation`] this [`HandoverProtocol`] belongs to.
    pub reservation_id: reservation::Id,

    /// [`Kind`] of this [`HandoverProtocol`].
    pub kind: Kind,

    /// Odometer reading of the [`Vehicle`] at the moment of handover.
    pub odometer: Mileage,

    /// Rendered [`Text`] of this [`HandoverProtocol`], signature placeholder
    /// already substituted.
    pub text: Text,

    /// Reference to the captured customer signature image.
    pub signature: image::Ref,

    /// [`DateTime`] when this [`HandoverProtocol`] was recorded.
    pub created_at: CreationDateTime,
}

/// ID of a [`HandoverProtocol`].
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

define_kind! {
    #[doc = "Kind of a [`HandoverProtocol`]."]
    enum Kind {
        #[doc = "The [`Vehicle`](crate::domain::Vehicle) departs to the \
                 customer."]
        Departure = 1,

        #[doc = "The [`Vehicle`](crate::domain::Vehicle) returns from the \
                 customer."]
        Return = 2,
    }
}

/// Rendered text of a [`HandoverProtocol`].
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

/// Return inspection checklist filled by staff before completing a
/// [`Reservation`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Checklist {
    /// [`FuelLevel`] of the returned [`Vehicle`].
    pub fuel: FuelLevel,

    /// [`Cleanliness`] of the returned [`Vehicle`].
    pub cleanliness: Cleanliness,

    /// Whether all keys and documents were handed back.
    pub keys_and_documents: bool,
}

define_kind! {
    #[doc = "Fuel tank level of a returned [`Vehicle`](crate::domain::Vehicle)."]
    enum FuelLevel {
        #[doc = "Empty tank."]
        Empty = 1,

        #[doc = "Quarter of a tank."]
        Quarter = 2,

        #[doc = "Half of a tank."]
        Half = 3,

        #[doc = "Three quarters of a tank."]
        ThreeQuarters = 4,

        #[doc = "Full tank."]
        Full = 5,
    }
}

define_kind! {
    #[doc = "Interior state of a returned [`Vehicle`](crate::domain::Vehicle)."]
    enum Cleanliness {
        #[doc = "Ready for the next customer as is."]
        Clean = 1,

        #[doc = "Usable, but scheduled for a regular wash."]
        Acceptable = 2,

        #[doc = "Requires paid cleaning before the next handover."]
        Dirty = 3,
    }
}

/// [`DateTime`] when a [`HandoverProtocol`] was recorded.
pub type CreationDateTime = DateTimeOf<(HandoverProtocol, unit::Creation)>;
