//! Handover protocol rendering.

use std::fmt::Write as _;

use crate::domain::{
    protocol::{Checklist, Kind, Text},
    reservation::Notes,
    vehicle::Mileage,
    Customer, Reservation, Vehicle, VehicleDamage,
};

use super::SIGNATURE_PLACEHOLDER;

/// Renders the handover protocol text for a [`Reservation`] at vehicle
/// departure or return.
///
/// The produced [`Text`] embeds the [`SIGNATURE_PLACEHOLDER`] exactly once.
/// The return [`Checklist`] and known damages of the [`Vehicle`] are listed
/// when provided.
#[expect(clippy::missing_panics_doc, reason = "infallible")]
#[must_use]
pub fn render(
    kind: Kind,
    customer: &Customer,
    vehicle: &Vehicle,
    reservation: &Reservation,
    odometer: Mileage,
    checklist: Option<&Checklist>,
    damages: &[VehicleDamage],
    notes: Option<&Notes>,
) -> Text {
    let title = match kind {
        Kind::Departure => "VEHICLE DEPARTURE PROTOCOL",
        Kind::Return => "VEHICLE RETURN PROTOCOL",
    };

    let mut text = format!(
        "{title}\n\
         ==========================\n\
         \n\
         Reservation: {reservation_id}\n\
         Customer: {customer_name}\n\
         Vehicle: {vehicle_name}\n\
         Odometer: {odometer} km\n",
        reservation_id = reservation.id,
        customer_name = customer.name,
        vehicle_name = vehicle.name,
    );

    if let Some(list) = checklist {
        _ = write!(
            text,
            "\nReturn checklist:\n\
             - Fuel level: {fuel}\n\
             - Cleanliness: {cleanliness}\n\
             - Keys and documents returned: {keys}\n",
            fuel = list.fuel,
            cleanliness = list.cleanliness,
            keys = if list.keys_and_documents { "yes" } else { "no" },
        );
    }

    if !damages.is_empty() {
        text.push_str("\nKnown damage:\n");
        for damage in damages {
            _ = writeln!(
                text,
                "- {location}: {description}",
                location = damage.location,
                description = damage.description,
            );
        }
    }

    if let Some(notes) = notes {
        _ = write!(text, "\nNotes:\n{notes}\n");
    }

    _ = write!(text, "\nCustomer signature:\n{SIGNATURE_PLACEHOLDER}\n");

    Text::new(text).expect("rendered protocol is non-empty")
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, DateTime, Money};
    use rust_decimal::Decimal;

    use crate::{
        document::SIGNATURE_PLACEHOLDER,
        domain::{
            customer, damage,
            protocol::{Checklist, Cleanliness, FuelLevel, Kind},
            reservation::{self, Period, Status},
            vehicle::{self, Mileage, RateSchedule},
            Customer, Reservation, Vehicle, VehicleDamage,
        },
    };

    use super::render;

    fn dt(s: &str) -> DateTime {
        DateTime::from_rfc3339(s).unwrap()
    }

    fn czk(amount: u32) -> Money {
        Money::new(Decimal::from(amount), Currency::Czk)
    }

    fn fixtures() -> (Customer, Vehicle, Reservation) {
        let customer = Customer {
            id: customer::Id::new(),
            name: customer::Name::new("Jan Novák").unwrap(),
            phone: None,
            email: None,
            license_number: customer::LicenseNumber::new("ED123456").unwrap(),
            license_image: None,
            created_at: dt("2026-07-01T00:00:00Z").coerce(),
        };
        let vehicle = Vehicle {
            id: vehicle::Id::new(),
            name: vehicle::Name::new("Škoda Octavia 4AB 1234").unwrap(),
            status: vehicle::Status::Available,
            mileage: Mileage::from(50_000),
            rates: RateSchedule::new(czk(800), czk(1200), czk(1500)).unwrap(),
            created_at: dt("2026-01-01T00:00:00Z").coerce(),
        };
        let reservation = Reservation {
            id: reservation::Id::new(),
            customer_id: Some(customer.id),
            vehicle_id: vehicle.id,
            period: Period::new(
                dt("2026-08-01T10:00:00Z"),
                dt("2026-08-02T10:00:00Z"),
            )
            .unwrap(),
            status: Status::Scheduled,
            start_mileage: None,
            end_mileage: None,
            notes: None,
            portal_token: None,
            created_at: dt("2026-07-01T00:00:00Z").coerce(),
        };
        (customer, vehicle, reservation)
    }

    #[test]
    fn departure_protocol_embeds_the_placeholder_once() {
        let (customer, vehicle, reservation) = fixtures();

        let text = render(
            Kind::Departure,
            &customer,
            &vehicle,
            &reservation,
            Mileage::from(50_000),
            None,
            &[],
            None,
        );
        let text: &str = text.as_ref();

        assert_eq!(text.matches(SIGNATURE_PLACEHOLDER).count(), 1);
        assert!(text.contains("DEPARTURE"));
        assert!(text.contains("Odometer: 50000 km"));
        assert!(!text.contains("Return checklist"));
    }

    #[test]
    fn return_protocol_lists_checklist_and_damage() {
        let (customer, vehicle, reservation) = fixtures();
        let damage = VehicleDamage {
            id: damage::Id::new(),
            vehicle_id: vehicle.id,
            reservation_id: Some(reservation.id),
            description: damage::Description::new("Scratched bumper")
                .unwrap(),
            location: damage::Location::new("Rear left").unwrap(),
            photo: None,
            reported_at: dt("2026-08-02T10:00:00Z").coerce(),
        };

        let text = render(
            Kind::Return,
            &customer,
            &vehicle,
            &reservation,
            Mileage::from(50_400),
            Some(&Checklist {
                fuel: FuelLevel::Full,
                cleanliness: Cleanliness::Clean,
                keys_and_documents: true,
            }),
            &[damage],
            None,
        );
        let text: &str = text.as_ref();

        assert!(text.contains("RETURN"));
        assert!(text.contains("Fuel level: FULL"));
        assert!(text.contains("Rear left: Scratched bumper"));
        assert_eq!(text.matches(SIGNATURE_PLACEHOLDER).count(), 1);
    }
}
