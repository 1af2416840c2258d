//! [`Vehicle`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, money::Currency, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fleet vehicle available for short-term rent.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// ID of this [`Vehicle`].
    pub id: Id,

    /// [`Name`] of this [`Vehicle`] (make, model and plate summary).
    pub name: Name,

    /// [`Status`] of this [`Vehicle`].
    pub status: Status,

    /// Current odometer reading of this [`Vehicle`].
    ///
    /// Monotonically non-decreasing: updated only from handover odometer
    /// readings validated against the previous value.
    pub mileage: Mileage,

    /// [`RateSchedule`] of this [`Vehicle`].
    pub rates: RateSchedule,

    /// [`DateTime`] when this [`Vehicle`] was added to the fleet.
    pub created_at: CreationDateTime,
}

/// ID of a [`Vehicle`].
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

/// Name of a [`Vehicle`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

define_kind! {
    #[doc = "Status of a [`Vehicle`]."]
    enum Status {
        #[doc = "The [`Vehicle`] may be booked and handed over."]
        Available = 1,

        #[doc = "The [`Vehicle`] is out with a customer."]
        Rented = 2,

        #[doc = "The [`Vehicle`] is withdrawn for maintenance."]
        Maintenance = 3,
    }
}

/// Odometer reading of a [`Vehicle`], in kilometers.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct Mileage(u32);

impl Mileage {
    /// Returns this reading as whole kilometers.
    #[must_use]
    pub const fn kilometers(self) -> u32 {
        self.0
    }

    /// Returns the distance driven since the `earlier` reading.
    ///
    /// [`None`] is returned if the `earlier` reading is ahead of this one,
    /// which indicates corrupt odometer data.
    #[must_use]
    pub fn distance_since(self, earlier: Self) -> Option<u32> {
        self.0.checked_sub(earlier.0)
    }
}

/// Rate schedule of a [`Vehicle`].
///
/// All three rates share a single [`Currency`] and are non-negative.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RateSchedule {
    /// Flat rate for rentals up to 4 hours.
    rate_4h: Money,

    /// Flat rate for rentals up to 12 hours.
    rate_12h: Money,

    /// Rate per started rental day beyond 12 hours.
    daily: Money,
}

impl RateSchedule {
    /// Creates a new [`RateSchedule`] if the given rates are valid.
    #[must_use]
    pub fn new(rate_4h: Money, rate_12h: Money, daily: Money) -> Option<Self> {
        (rate_4h.currency == rate_12h.currency
            && rate_12h.currency == daily.currency
            && !rate_4h.is_negative()
            && !rate_12h.is_negative()
            && !daily.is_negative())
        .then_some(Self {
            rate_4h,
            rate_12h,
            daily,
        })
    }

    /// Returns the flat rate for rentals up to 4 hours.
    #[must_use]
    pub const fn rate_4h(&self) -> Money {
        self.rate_4h
    }

    /// Returns the flat rate for rentals up to 12 hours.
    #[must_use]
    pub const fn rate_12h(&self) -> Money {
        self.rate_12h
    }

    /// Returns the rate per started rental day.
    #[must_use]
    pub const fn daily(&self) -> Money {
        self.daily
    }

    /// Returns the [`Currency`] all rates of this schedule share.
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.rate_4h.currency
    }
}

/// [`DateTime`] when a [`Vehicle`] was added to the fleet.
pub type CreationDateTime = DateTimeOf<(Vehicle, unit::Creation)>;
