//! Rental pricing engine.
//!
//! Pure calculations over a [`Vehicle`]'s [`RateSchedule`]: no clock, no
//! database. Duration tiering and the mileage overage charge live here, and
//! nowhere else.
//!
//! [`Vehicle`]: crate::domain::Vehicle

use std::time::Duration;

use common::Money;
use rust_decimal::Decimal;

use crate::domain::vehicle::RateSchedule;

/// Number of seconds in one rental day.
const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Number of seconds in the 4-hour rate tier.
const SECS_4H: u64 = 4 * 60 * 60;

/// Number of seconds in the 12-hour rate tier.
const SECS_12H: u64 = 12 * 60 * 60;

/// Pricing configuration of the rental service.
#[derive(Clone, Debug)]
pub struct Config {
    /// Kilometers included in the rental price per started rental day.
    pub free_km_per_day: u32,

    /// Fee charged per kilometer driven over the included allowance, in the
    /// [`RateSchedule`]'s currency.
    pub overage_fee_per_km: Decimal,

    /// Refundable deposit collected at vehicle handover.
    pub deposit: Money,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            free_km_per_day: 300,
            overage_fee_per_km: Decimal::from(3),
            deposit: Money::new(
                Decimal::from(5000),
                common::money::Currency::Czk,
            ),
        }
    }
}

/// Final price breakdown of a completed rental.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Quote {
    /// Duration-based base price.
    pub base: Money,

    /// Kilometers included in the base price.
    pub km_limit: u64,

    /// Kilometers driven over the included allowance.
    pub km_over: u64,

    /// Charge for the kilometers driven over the allowance.
    pub overage: Money,

    /// Total price: base plus overage.
    pub total: Money,
}

/// Returns the number of started rental days the given `duration` spans.
///
/// Any fraction of a day counts as a full day, and every rental is at least
/// one day long for the purpose of the mileage allowance.
#[must_use]
pub fn rental_days(duration: Duration) -> u64 {
    let mut secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs += 1;
    }
    (secs.div_ceil(SECS_PER_DAY)).max(1)
}

/// Calculates the duration-based base price over the given [`RateSchedule`].
///
/// Rentals up to 4 hours pay the flat 4-hour rate, up to 12 hours the flat
/// 12-hour rate, and anything longer pays the daily rate per started day.
/// Tier boundaries are inclusive: exactly 4 hours still prices as the 4-hour
/// tier.
#[must_use]
pub fn base_price(rates: &RateSchedule, duration: Duration) -> Money {
    let mut secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs += 1;
    }
    if secs <= SECS_4H {
        rates.rate_4h()
    } else if secs <= SECS_12H {
        rates.rate_12h()
    } else {
        let days = Decimal::from(secs.div_ceil(SECS_PER_DAY));
        Money::new(days * rates.daily().amount, rates.currency())
    }
}

/// Produces the final [`Quote`] of a rental.
///
/// The mileage allowance is `free_km_per_day` kilometers per started rental
/// day, and every kilometer above it is charged at `overage_fee_per_km` in
/// the [`RateSchedule`]'s currency.
#[must_use]
pub fn quote(
    rates: &RateSchedule,
    duration: Duration,
    distance_km: u32,
    config: &Config,
) -> Quote {
    let base = base_price(rates, duration);
    let km_limit = rental_days(duration) * u64::from(config.free_km_per_day);
    let km_over = u64::from(distance_km).saturating_sub(km_limit);
    let overage = Money::new(
        Decimal::from(km_over) * config.overage_fee_per_km,
        rates.currency(),
    );
    let total = Money::new(base.amount + overage.amount, rates.currency());

    Quote {
        base,
        km_limit,
        km_over,
        overage,
        total,
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{money::Currency, Money};
    use rust_decimal::Decimal;

    use crate::domain::vehicle::RateSchedule;

    use super::{base_price, quote, rental_days, Config};

    fn czk(amount: u32) -> Money {
        Money::new(Decimal::from(amount), Currency::Czk)
    }

    fn rates() -> RateSchedule {
        RateSchedule::new(czk(800), czk(1200), czk(1500)).unwrap()
    }

    #[test]
    fn four_hour_boundary_is_inclusive() {
        assert_eq!(
            base_price(&rates(), Duration::from_secs(4 * 60 * 60)),
            czk(800),
        );
        assert_eq!(
            base_price(&rates(), Duration::from_secs(4 * 60 * 60 + 1)),
            czk(1200),
        );
    }

    #[test]
    fn sub_second_overshoot_bumps_the_tier() {
        assert_eq!(
            base_price(
                &rates(),
                Duration::new(4 * 60 * 60, 1),
            ),
            czk(1200),
        );
    }

    #[test]
    fn twelve_hour_boundary_is_inclusive() {
        assert_eq!(
            base_price(&rates(), Duration::from_secs(12 * 60 * 60)),
            czk(1200),
        );
        assert_eq!(
            base_price(&rates(), Duration::from_secs(12 * 60 * 60 + 1)),
            czk(1500),
        );
    }

    #[test]
    fn days_are_started_not_elapsed() {
        assert_eq!(
            base_price(&rates(), Duration::from_secs(23 * 60 * 60 + 59 * 60)),
            czk(1500),
        );
        assert_eq!(
            base_price(&rates(), Duration::from_secs(24 * 60 * 60)),
            czk(1500),
        );
        assert_eq!(
            base_price(&rates(), Duration::from_secs(24 * 60 * 60 + 1)),
            czk(3000),
        );
    }

    #[test]
    fn short_rentals_still_count_as_one_day() {
        assert_eq!(rental_days(Duration::from_secs(60)), 1);
        assert_eq!(rental_days(Duration::from_secs(24 * 60 * 60)), 1);
        assert_eq!(rental_days(Duration::from_secs(24 * 60 * 60 + 1)), 2);
    }

    #[test]
    fn overage_charges_only_kilometers_above_the_allowance() {
        let q = quote(
            &rates(),
            Duration::from_secs(24 * 60 * 60),
            350,
            &Config::default(),
        );

        assert_eq!(q.base, czk(1500));
        assert_eq!(q.km_limit, 300);
        assert_eq!(q.km_over, 50);
        assert_eq!(q.overage, czk(150));
        assert_eq!(q.total, czk(1650));
    }

    #[test]
    fn driving_within_the_allowance_costs_nothing_extra() {
        let q = quote(
            &rates(),
            Duration::from_secs(24 * 60 * 60),
            300,
            &Config::default(),
        );

        assert_eq!(q.km_over, 0);
        assert_eq!(q.overage, czk(0));
        assert_eq!(q.total, q.base);
    }

    #[test]
    fn allowance_scales_with_started_days() {
        let q = quote(
            &rates(),
            Duration::from_secs(2 * 24 * 60 * 60),
            650,
            &Config::default(),
        );

        assert_eq!(q.km_limit, 600);
        assert_eq!(q.km_over, 50);
        assert_eq!(q.total, czk(3150));
    }
}
