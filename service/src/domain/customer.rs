//! [`Customer`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::image;

/// Customer renting [`Vehicle`]s.
///
/// [`Vehicle`]: crate::domain::Vehicle
#[derive(Clone, Debug)]
pub struct Customer {
    /// ID of this [`Customer`].
    pub id: Id,

    /// [`Name`] of this [`Customer`].
    pub name: Name,

    /// [`Phone`] of this [`Customer`].
    pub phone: Option<Phone>,

    /// [`Email`] of this [`Customer`].
    pub email: Option<Email>,

    /// Driving [`LicenseNumber`] of this [`Customer`].
    pub license_number: LicenseNumber,

    /// Uploaded image of the driving license, if any.
    ///
    /// Required before a self-service reservation may be submitted for
    /// approval.
    pub license_image: Option<image::Ref>,

    /// [`DateTime`] when this [`Customer`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Customer`].
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

/// Name of a [`Customer`].
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

/// Phone number of a [`Customer`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`] if the given `phone` is valid.
    #[must_use]
    pub fn new(phone: impl Into<String>) -> Option<Self> {
        let phone = phone.into();
        Self::check(&phone).then_some(Self(phone))
    }

    /// Checks whether the given `phone` is a valid [`Phone`].
    fn check(phone: impl AsRef<str>) -> bool {
        let phone = phone.as_ref();
        phone.trim() == phone
            && !phone.is_empty()
            && phone.len() <= 32
            && phone
                .chars()
                .all(|c| c.is_ascii_digit() || "+ ()-".contains(c))
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

/// Email address of a [`Customer`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `email` is valid.
    #[must_use]
    pub fn new(email: impl Into<String>) -> Option<Self> {
        let email = email.into();
        Self::check(&email).then_some(Self(email))
    }

    /// Checks whether the given `email` is a valid [`Email`].
    fn check(email: impl AsRef<str>) -> bool {
        let email = email.as_ref();
        email.trim() == email
            && email.len() <= 512
            && email.split_once('@').is_some_and(|(local, host)| {
                !local.is_empty() && !host.is_empty() && !host.contains('@')
            })
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Driving license number of a [`Customer`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct LicenseNumber(String);

impl LicenseNumber {
    /// Creates a new [`LicenseNumber`] if the given `num` is valid.
    #[must_use]
    pub fn new(num: impl Into<String>) -> Option<Self> {
        let num = num.into();
        Self::check(&num).then_some(Self(num))
    }

    /// Checks whether the given `num` is a valid [`LicenseNumber`].
    fn check(num: impl AsRef<str>) -> bool {
        let num = num.as_ref();
        num.trim() == num && !num.is_empty() && num.len() <= 64
    }
}

impl FromStr for LicenseNumber {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `LicenseNumber`")
    }
}

/// [`DateTime`] when a [`Customer`] was created.
pub type CreationDateTime = DateTimeOf<(Customer, unit::Creation)>;
