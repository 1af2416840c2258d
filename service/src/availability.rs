//! [`Vehicle`] availability resolution.

use crate::domain::{
    reservation::{self, Period},
    vehicle::{self, Status},
    Reservation, Vehicle,
};

/// Resolves whether the given [`Vehicle`] is available for rent over the
/// provided [`Period`].
///
/// A [`Vehicle`] is unavailable if it's withdrawn for maintenance, or if any
/// of the given open [`Reservation`]s of this [`Vehicle`] overlaps the
/// requested [`Period`]. [`Reservation`]s of other [`Vehicle`]s and closed
/// ones are ignored, so the caller may pass an unfiltered set.
///
/// [`Period`]s are half-open, so a rental may start exactly when another
/// one ends.
pub fn is_available<'r>(
    vehicle: &Vehicle,
    period: &Period,
    reservations: impl IntoIterator<Item = &'r Reservation>,
) -> bool {
    if vehicle.status == Status::Maintenance {
        return false;
    }
    !reservations
        .into_iter()
        .filter(|r| r.vehicle_id == vehicle.id && r.is_open())
        .any(|r| r.period.overlaps(period))
}

/// Resolves whether the given [`Vehicle`] is available for the [`Period`],
/// ignoring the [`Reservation`] with the provided `except` ID.
///
/// Used when a [`Reservation`] re-checks availability of its own window, so
/// it doesn't conflict with itself.
pub fn is_available_except<'r>(
    vehicle: &Vehicle,
    period: &Period,
    except: reservation::Id,
    reservations: impl IntoIterator<Item = &'r Reservation>,
) -> bool {
    is_available(
        vehicle,
        period,
        reservations.into_iter().filter(|r| r.id != except),
    )
}

/// Yields [`Id`]s of the [`Vehicle`]s available for the [`Period`] among the
/// provided fleet.
///
/// [`Id`]: vehicle::Id
pub fn available_vehicles<'v>(
    fleet: impl IntoIterator<Item = &'v Vehicle>,
    period: &Period,
    reservations: &[Reservation],
) -> Vec<vehicle::Id> {
    fleet
        .into_iter()
        .filter(|v| is_available(v, period, reservations))
        .map(|v| v.id)
        .collect()
}

#[cfg(test)]
mod spec {
    use common::{DateTime, Money};
    use rust_decimal::Decimal;

    use crate::domain::{
        reservation::{self, Period, Status as ReservationStatus},
        vehicle::{self, Mileage, RateSchedule, Status},
        Reservation, Vehicle,
    };

    use super::{available_vehicles, is_available, is_available_except};

    fn dt(s: &str) -> DateTime {
        DateTime::from_rfc3339(s).unwrap()
    }

    fn period(start: &str, end: &str) -> Period {
        Period::new(dt(start), dt(end)).unwrap()
    }

    fn czk(amount: u32) -> Money {
        Money::new(Decimal::from(amount), common::money::Currency::Czk)
    }

    fn vehicle(status: Status) -> Vehicle {
        Vehicle {
            id: vehicle::Id::new(),
            name: vehicle::Name::new("Škoda Octavia 4AB 1234").unwrap(),
            status,
            mileage: Mileage::from(50_000),
            rates: RateSchedule::new(czk(800), czk(1200), czk(1500)).unwrap(),
            created_at: dt("2026-01-01T00:00:00Z").coerce(),
        }
    }

    fn reservation(
        vehicle_id: vehicle::Id,
        status: ReservationStatus,
        period: Period,
    ) -> Reservation {
        Reservation {
            id: reservation::Id::new(),
            customer_id: None,
            vehicle_id,
            period,
            status,
            start_mileage: None,
            end_mileage: None,
            notes: None,
            portal_token: None,
            created_at: dt("2026-01-01T00:00:00Z").coerce(),
        }
    }

    #[test]
    fn vehicle_in_maintenance_is_never_available() {
        let v = vehicle(Status::Maintenance);

        assert!(!is_available(
            &v,
            &period("2026-08-01T10:00:00Z", "2026-08-02T10:00:00Z"),
            [],
        ));
    }

    #[test]
    fn open_overlapping_reservation_blocks_the_window() {
        let v = vehicle(Status::Available);
        let booked = reservation(
            v.id,
            ReservationStatus::Scheduled,
            period("2026-08-01T10:00:00Z", "2026-08-03T10:00:00Z"),
        );

        assert!(!is_available(
            &v,
            &period("2026-08-02T09:00:00Z", "2026-08-04T09:00:00Z"),
            [&booked],
        ));
    }

    #[test]
    fn back_to_back_rentals_are_allowed() {
        let v = vehicle(Status::Available);
        let booked = reservation(
            v.id,
            ReservationStatus::Active,
            period("2026-08-01T10:00:00Z", "2026-08-03T10:00:00Z"),
        );

        assert!(is_available(
            &v,
            &period("2026-08-03T10:00:00Z", "2026-08-05T10:00:00Z"),
            [&booked],
        ));
    }

    #[test]
    fn closed_and_foreign_reservations_are_ignored() {
        let v = vehicle(Status::Available);
        let window = period("2026-08-01T10:00:00Z", "2026-08-03T10:00:00Z");
        let completed =
            reservation(v.id, ReservationStatus::Completed, window);
        let pending =
            reservation(v.id, ReservationStatus::PendingApproval, window);
        let other = reservation(
            vehicle::Id::new(),
            ReservationStatus::Active,
            window,
        );

        assert!(is_available(&v, &window, [&completed, &pending, &other]));
    }

    #[test]
    fn own_reservation_is_excluded_from_the_recheck() {
        let v = vehicle(Status::Available);
        let window = period("2026-08-01T10:00:00Z", "2026-08-03T10:00:00Z");
        let own = reservation(v.id, ReservationStatus::Scheduled, window);

        assert!(!is_available(&v, &window, [&own]));
        assert!(is_available_except(&v, &window, own.id, [&own]));
    }

    #[test]
    fn filters_the_fleet_down_to_free_vehicles() {
        let free = vehicle(Status::Available);
        let busy = vehicle(Status::Available);
        let window = period("2026-08-01T10:00:00Z", "2026-08-03T10:00:00Z");
        let booked =
            reservation(busy.id, ReservationStatus::Scheduled, window);

        assert_eq!(
            available_vehicles([&free, &busy], &window, &[booked]),
            vec![free.id],
        );
    }
}
