//! [`FinancialTransaction`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::reservation;
#[cfg(doc)]
use crate::domain::Reservation;

/// Append-only financial ledger entry.
///
/// Never updated or deleted once recorded.
#[derive(Clone, Debug)]
pub struct FinancialTransaction {
    /// ID of this [`FinancialTransaction`].
    pub id: Id,

    /// [`Kind`] of this [`FinancialTransaction`].
    pub kind: Kind,

    /// Amount of this [`FinancialTransaction`].
    pub amount: Money,

    /// [`DateTime`] when this [`FinancialTransaction`] was recorded.
    pub date: CreationDateTime,

    /// Human-readable [`Description`] of this [`FinancialTransaction`].
    pub description: Description,

    /// ID of the [`Reservation`] this [`FinancialTransaction`] settles, if
    /// any.
    pub reservation_id: Option<reservation::Id>,
}

/// ID of a [`FinancialTransaction`].
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
    #[doc = "Kind of a [`FinancialTransaction`]."]
    enum Kind {
        #[doc = "Money received by the agency."]
        Income = 1,

        #[doc = "Money paid out by the agency."]
        Expense = 2,
    }
}

/// Human-readable description of a [`FinancialTransaction`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        (!text.is_empty()).then_some(Self(text))
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

/// [`DateTime`] when a [`FinancialTransaction`] was recorded.
pub type CreationDateTime = DateTimeOf<(FinancialTransaction, unit::Creation)>;
