//! Rental contract drafting.

use common::Money;

use crate::{
    domain::{contract::Text, Customer, Reservation, Vehicle},
    pricing,
};

use super::SIGNATURE_PLACEHOLDER;

/// Drafts the rental contract text for an approved [`Reservation`].
///
/// The produced [`Text`] embeds the [`SIGNATURE_PLACEHOLDER`] exactly once,
/// to be substituted with the customer signature at vehicle handover.
#[expect(clippy::missing_panics_doc, reason = "infallible")]
#[must_use]
pub fn draft(
    customer: &Customer,
    vehicle: &Vehicle,
    reservation: &Reservation,
    base_price: Money,
    config: &pricing::Config,
) -> Text {
    let km_limit = pricing::rental_days(reservation.period.duration())
        * u64::from(config.free_km_per_day);

    let text = format!(
        "RENTAL CONTRACT\n\
         ===============\n\
         \n\
         Reservation: {reservation_id}\n\
         \n\
         Renter: {customer_name}\n\
         Driving license: {license}\n\
         \n\
         Vehicle: {vehicle_name}\n\
         Odometer at contract: {mileage} km\n\
         \n\
         Rental period: {start} - {end}\n\
         Base price: {base_price}\n\
         Included mileage: {km_limit} km\n\
         Overage fee: {overage_fee}{currency} per km\n\
         Refundable deposit: {deposit}\n\
         \n\
         The renter confirms taking over the vehicle in the described state \
         and agrees to the terms above.\n\
         \n\
         Customer signature:\n\
         {SIGNATURE_PLACEHOLDER}\n",
        reservation_id = reservation.id,
        customer_name = customer.name,
        license = customer.license_number,
        vehicle_name = vehicle.name,
        mileage = vehicle.mileage,
        start = reservation.period.start().to_rfc3339(),
        end = reservation.period.end().to_rfc3339(),
        overage_fee = config.overage_fee_per_km,
        currency = vehicle.rates.currency(),
        deposit = config.deposit,
    );

    Text::new(text).expect("rendered contract is non-empty")
}
