//! [`Reservation`] definitions.

pub mod portal;

use std::time::Duration;

use common::{define_kind, unit, DateTime, DateTimeOf};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{customer, vehicle, vehicle::Mileage};
#[cfg(doc)]
use crate::domain::{Customer, Vehicle};

pub use self::portal::Token;

/// Rental [`Reservation`] of a [`Vehicle`] by a [`Customer`].
///
/// Mutated exclusively through lifecycle commands; deleted only by explicit
/// rejection while still in a pre-activation [`Status`].
#[derive(Clone, Debug)]
pub struct Reservation {
    /// ID of this [`Reservation`].
    pub id: Id,

    /// ID of the [`Customer`] this [`Reservation`] belongs to.
    ///
    /// Absent only while the [`Reservation`] is [`Status::PendingCustomer`].
    pub customer_id: Option<customer::Id>,

    /// ID of the [`Vehicle`] this [`Reservation`] books.
    pub vehicle_id: vehicle::Id,

    /// Rental [`Period`] of this [`Reservation`].
    pub period: Period,

    /// [`Status`] of this [`Reservation`].
    pub status: Status,

    /// Odometer reading at departure, once the [`Reservation`] is activated.
    pub start_mileage: Option<Mileage>,

    /// Odometer reading at return, once the [`Reservation`] is completed.
    pub end_mileage: Option<Mileage>,

    /// Free-form [`Notes`] about this [`Reservation`].
    pub notes: Option<Notes>,

    /// Portal [`Token`] granting self-service access, until consumed.
    pub portal_token: Option<Token>,

    /// [`DateTime`] when this [`Reservation`] was created.
    pub created_at: CreationDateTime,
}

impl Reservation {
    /// Advances this [`Reservation`] to the `next` [`Status`].
    ///
    /// Sole entry point of lifecycle transitions: any step not present in the
    /// transition table is rejected.
    ///
    /// # Errors
    ///
    /// If the current [`Status`] doesn't admit the `next` one.
    pub fn advance(&mut self, next: Status) -> Result<(), TransitionError> {
        if !self.status.admits(next) {
            return Err(TransitionError {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Indicates whether this [`Reservation`] occupies its [`Vehicle`]'s time
    /// window (is [`Status::Scheduled`] or [`Status::Active`]).
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }
}

/// ID of a [`Reservation`].
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
    #[doc = "Status of a [`Reservation`]."]
    enum Status {
        #[doc = "Self-service link issued, customer details not submitted \
                 yet."]
        PendingCustomer = 1,

        #[doc = "Customer details submitted, awaiting staff approval."]
        PendingApproval = 2,

        #[doc = "Approved by staff, contract drafted, vehicle not departed \
                 yet."]
        Scheduled = 3,

        #[doc = "Vehicle physically departed to the customer."]
        Active = 4,

        #[doc = "Vehicle returned. Terminal."]
        Completed = 5,
    }
}

impl Status {
    /// Indicates whether this [`Status`] admits transitioning to the `next`
    /// one.
    #[must_use]
    pub fn admits(self, next: Self) -> bool {
        use Status as S;

        matches!(
            (self, next),
            (S::PendingCustomer, S::PendingApproval)
                | (S::PendingApproval, S::Scheduled)
                | (S::Scheduled, S::Active)
                | (S::Active, S::Completed)
        )
    }

    /// Indicates whether a [`Reservation`] in this [`Status`] occupies its
    /// [`Vehicle`]'s time window.
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, Self::Scheduled | Self::Active)
    }

    /// Indicates whether a [`Reservation`] in this [`Status`] has not been
    /// activated yet (and so still may be rejected).
    #[must_use]
    pub fn is_pre_activation(self) -> bool {
        matches!(
            self,
            Self::PendingCustomer | Self::PendingApproval | Self::Scheduled
        )
    }
}

/// Error of an illegal [`Reservation`] [`Status`] transition.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("illegal `Reservation` transition: {from} -> {to}")]
pub struct TransitionError {
    /// [`Status`] the [`Reservation`] was in.
    pub from: Status,

    /// [`Status`] the transition was attempted into.
    pub to: Status,
}

/// Half-open rental window `[start, end)` of a [`Reservation`].
///
/// Validated on construction: `start` is strictly before `end`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Period {
    /// [`DateTime`] when the rental starts.
    start: StartDateTime,

    /// [`DateTime`] when the rental ends (exclusive).
    end: EndDateTime,
}

impl Period {
    /// Creates a new [`Period`] if `start` is strictly before `end`.
    #[must_use]
    pub fn new(start: DateTime, end: DateTime) -> Option<Self> {
        (start < end).then_some(Self {
            start: start.coerce(),
            end: end.coerce(),
        })
    }

    /// Returns the [`DateTime`] when the rental starts.
    #[must_use]
    pub const fn start(&self) -> StartDateTime {
        self.start
    }

    /// Returns the [`DateTime`] when the rental ends (exclusive).
    #[must_use]
    pub const fn end(&self) -> EndDateTime {
        self.end
    }

    /// Returns the [`Duration`] this [`Period`] spans.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end.coerce::<()>() - self.start.coerce()
    }

    /// Indicates whether this [`Period`] overlaps with the `other` one.
    ///
    /// Windows are half-open, so back-to-back periods (one ending exactly
    /// when the other starts) don't overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start.coerce::<()>() < other.end.coerce()
            && self.end.coerce::<()>() > other.start.coerce()
    }
}

/// Free-form notes about a [`Reservation`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Notes(String);

impl Notes {
    /// Creates new [`Notes`] if the given `notes` are valid.
    #[must_use]
    pub fn new(notes: impl Into<String>) -> Option<Self> {
        let notes = notes.into();
        Self::check(&notes).then_some(Self(notes))
    }

    /// Checks whether the given `notes` are valid [`Notes`].
    fn check(notes: impl AsRef<str>) -> bool {
        let notes = notes.as_ref();
        notes.trim() == notes && !notes.is_empty() && notes.len() <= 4096
    }
}

impl FromStr for Notes {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Notes`")
    }
}

/// Marker type indicating a [`Reservation`] start.
#[derive(Clone, Copy, Debug)]
pub struct Start;

/// Marker type indicating a [`Reservation`] end.
#[derive(Clone, Copy, Debug)]
pub struct End;

/// [`DateTime`] when a [`Reservation`]'s rental window starts.
pub type StartDateTime = DateTimeOf<(Reservation, Start)>;

/// [`DateTime`] when a [`Reservation`]'s rental window ends.
pub type EndDateTime = DateTimeOf<(Reservation, End)>;

/// [`DateTime`] when a [`Reservation`] was created.
pub type CreationDateTime = DateTimeOf<(Reservation, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::DateTime;

    use super::{Period, Status};

    fn dt(s: &str) -> DateTime {
        DateTime::from_rfc3339(s).unwrap()
    }

    #[test]
    fn period_rejects_inverted_and_empty_windows() {
        let at = dt("2026-08-01T10:00:00Z");
        assert!(Period::new(at, at).is_none());
        assert!(Period::new(dt("2026-08-01T11:00:00Z"), at).is_none());
        assert!(Period::new(at, dt("2026-08-01T10:00:01Z")).is_some());
    }

    #[test]
    fn back_to_back_periods_dont_overlap() {
        let first = Period::new(
            dt("2026-08-01T10:00:00Z"),
            dt("2026-08-01T14:00:00Z"),
        )
        .unwrap();
        let second = Period::new(
            dt("2026-08-01T14:00:00Z"),
            dt("2026-08-01T16:00:00Z"),
        )
        .unwrap();

        assert!(!first.overlaps(&second));
        assert!(!second.overlaps(&first));
    }

    #[test]
    fn overlapping_periods_overlap_symmetrically() {
        let first = Period::new(
            dt("2026-08-01T10:00:00Z"),
            dt("2026-08-01T14:00:00Z"),
        )
        .unwrap();
        let second = Period::new(
            dt("2026-08-01T13:00:00Z"),
            dt("2026-08-01T16:00:00Z"),
        )
        .unwrap();

        assert!(first.overlaps(&second));
        assert!(second.overlaps(&first));
    }

    #[test]
    fn transition_table() {
        use Status as S;

        let all = [
            S::PendingCustomer,
            S::PendingApproval,
            S::Scheduled,
            S::Active,
            S::Completed,
        ];
        let allowed = [
            (S::PendingCustomer, S::PendingApproval),
            (S::PendingApproval, S::Scheduled),
            (S::Scheduled, S::Active),
            (S::Active, S::Completed),
        ];

        for from in all {
            for to in all {
                assert_eq!(
                    from.admits(to),
                    allowed.contains(&(from, to)),
                    "{from} -> {to}",
                );
            }
        }
    }
}
