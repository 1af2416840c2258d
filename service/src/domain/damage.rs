//! [`VehicleDamage`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{image, reservation, vehicle};
#[cfg(doc)]
use crate::domain::{Reservation, Vehicle};

/// Damage reported on a [`Vehicle`].
#[derive(Clone, Debug)]
pub struct VehicleDamage {
    /// ID of this [`VehicleDamage`].
    pub id: Id,

    /// ID of the damaged [`Vehicle`].
    pub vehicle_id: vehicle::Id,

    /// ID of the [`Reservation`] during which the damage was found, if any.
    pub reservation_id: Option<reservation::Id>,

    /// [`Description`] of the damage.
    pub description: Description,

    /// [`Location`] of the damage on the [`Vehicle`].
    pub location: Location,

    /// Reference to an uploaded photo of the damage, if any.
    pub photo: Option<image::Ref>,

    /// [`DateTime`] when this [`VehicleDamage`] was reported.
    pub reported_at: ReportDateTime,
}

/// ID of a [`VehicleDamage`].
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

/// Description of a [`VehicleDamage`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        Self::check(&text).then_some(Self(text))
    }

    /// Checks whether the given `text` is a valid [`Description`].
    fn check(text: impl AsRef<str>) -> bool {
        let text = text.as_ref();
        text.trim() == text && !text.is_empty() && text.len() <= 2048
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

/// Location of a [`VehicleDamage`] on the [`Vehicle`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Location(String);

impl Location {
    /// Creates a new [`Location`] if the given `location` is valid.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Option<Self> {
        let location = location.into();
        Self::check(&location).then_some(Self(location))
    }

    /// Checks whether the given `location` is a valid [`Location`].
    fn check(location: impl AsRef<str>) -> bool {
        let location = location.as_ref();
        location.trim() == location
            && !location.is_empty()
            && location.len() <= 256
    }
}

impl FromStr for Location {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Location`")
    }
}

/// [`DateTime`] when a [`VehicleDamage`] was reported.
pub type ReportDateTime = DateTimeOf<(VehicleDamage, unit::Creation)>;
