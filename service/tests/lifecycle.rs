//! End-to-end reservation lifecycle tests over the in-memory infrastructure.

use common::{
    money::Currency,
    operations::{By, Insert, Select, Update},
    DateTime, Money,
};
use rust_decimal::Decimal;
use service::{
    command::{
        activate_reservation, complete_reservation,
        create_portal_reservation, submit_customer_details,
        ActivateReservation, ApproveReservation, CompleteReservation,
        CreatePortalReservation, CreateReservation, RejectReservation,
        SubmitCustomerDetails,
    },
    domain::{
        customer, image,
        protocol::{Checklist, Cleanliness, FuelLevel},
        reservation::Status,
        transaction,
        vehicle::{self, Mileage, RateSchedule},
        Customer, FinancialTransaction, Reservation, Vehicle,
    },
    infra::{database::InMemory, storage::ImageStore, Clock, Database as _},
    Config, Service,
};

fn dt(s: &str) -> DateTime {
    DateTime::from_rfc3339(s).unwrap()
}

fn czk(amount: u32) -> Money {
    Money::new(Decimal::from(amount), Currency::Czk)
}

fn service() -> Service<InMemory, ImageStore> {
    Service::new(
        Config::default(),
        InMemory::new(),
        ImageStore::new(),
        Clock::fixed(dt("2026-07-01T09:00:00Z")),
    )
}

async fn seed_vehicle(svc: &Service<InMemory, ImageStore>) -> Vehicle {
    let vehicle = Vehicle {
        id: vehicle::Id::new(),
        name: vehicle::Name::new("Škoda Octavia 4AB 1234").unwrap(),
        status: vehicle::Status::Available,
        mileage: Mileage::from(50_000),
        rates: RateSchedule::new(czk(800), czk(1200), czk(1500)).unwrap(),
        created_at: dt("2026-01-01T00:00:00Z").coerce(),
    };
    svc.database()
        .execute(Insert(vehicle.clone()))
        .await
        .unwrap();
    vehicle
}

async fn seed_customer(svc: &Service<InMemory, ImageStore>) -> Customer {
    let customer = Customer {
        id: customer::Id::new(),
        name: customer::Name::new("Jan Novák").unwrap(),
        phone: customer::Phone::new("+420 777 123 456"),
        email: customer::Email::new("jan@example.com"),
        license_number: customer::LicenseNumber::new("ED123456").unwrap(),
        license_image: None,
        created_at: dt("2026-01-01T00:00:00Z").coerce(),
    };
    svc.database()
        .execute(Insert(customer.clone()))
        .await
        .unwrap();
    customer
}

async fn reservation_by_id(
    svc: &Service<InMemory, ImageStore>,
    id: service::domain::reservation::Id,
) -> Option<Reservation> {
    svc.database()
        .execute(Select(By::<Option<Reservation>, _>::new(id)))
        .await
        .unwrap()
}

fn checklist() -> Checklist {
    Checklist {
        fuel: FuelLevel::Full,
        cleanliness: Cleanliness::Clean,
        keys_and_documents: true,
    }
}

#[tokio::test]
async fn full_portal_lifecycle_settles_the_rental() {
    let svc = service();
    let vehicle = seed_vehicle(&svc).await;

    let reservation = svc
        .execute(CreatePortalReservation {
            vehicle_id: vehicle.id,
            start: dt("2026-08-01T10:00:00Z"),
            end: dt("2026-08-02T10:00:00Z"),
        })
        .await
        .unwrap();
    assert_eq!(reservation.status, Status::PendingCustomer);
    let token = reservation.portal_token.clone().unwrap();

    let reservation = svc
        .execute(SubmitCustomerDetails {
            token,
            name: customer::Name::new("Jan Novák").unwrap(),
            phone: customer::Phone::new("+420 777 123 456"),
            email: customer::Email::new("jan@example.com"),
            license_number: customer::LicenseNumber::new("ED123456").unwrap(),
            license_image: image::Bytes::new(vec![0xFF, 0xD8]),
        })
        .await
        .unwrap();
    assert_eq!(reservation.status, Status::PendingApproval);
    assert!(reservation.portal_token.is_none());
    assert!(reservation.customer_id.is_some());

    let contract = svc
        .execute(ApproveReservation {
            reservation_id: reservation.id,
        })
        .await
        .unwrap();
    assert!(!contract.is_signed());
    assert!(contract
        .text
        .to_string()
        .contains("<<CUSTOMER-SIGNATURE>>"));

    let handover = svc
        .execute(ActivateReservation {
            reservation_id: reservation.id,
            odometer: Mileage::from(50_000),
            signature: image::Bytes::new(vec![0x89, 0x50]),
        })
        .await
        .unwrap();
    assert!(!handover.text.to_string().contains("<<CUSTOMER-SIGNATURE>>"));

    let rented = svc
        .database()
        .execute(Select(By::<Option<Vehicle>, _>::new(vehicle.id)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rented.status, vehicle::Status::Rented);

    let completion = svc
        .execute(CompleteReservation {
            reservation_id: reservation.id,
            odometer: Mileage::from(50_400),
            signature: image::Bytes::new(vec![0x89, 0x50]),
            checklist: Some(checklist()),
            damages: vec![],
            refueling_cost: None,
            deposit_forfeited: false,
            notes: None,
        })
        .await
        .unwrap();

    // 24h rental: 1 day x 1500, 400 km driven with 300 km included,
    // 100 km x 3 overage.
    assert_eq!(completion.quote.base, czk(1500));
    assert_eq!(completion.quote.km_over, 100);
    assert_eq!(completion.quote.overage, czk(300));
    assert_eq!(completion.quote.total, czk(1800));
    assert_eq!(completion.transactions.len(), 1);
    assert_eq!(completion.transactions[0].kind, transaction::Kind::Income);
    assert_eq!(completion.transactions[0].amount, czk(1800));

    let returned = svc
        .database()
        .execute(Select(By::<Option<Vehicle>, _>::new(vehicle.id)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(returned.status, vehicle::Status::Available);
    assert_eq!(returned.mileage, Mileage::from(50_400));

    let completed = reservation_by_id(&svc, reservation.id).await.unwrap();
    assert_eq!(completed.status, Status::Completed);
    assert_eq!(completed.end_mileage, Some(Mileage::from(50_400)));

    let ledger = svc
        .database()
        .execute(Select(By::<Vec<FinancialTransaction>, _>::new(
            reservation.id,
        )))
        .await
        .unwrap();
    assert_eq!(ledger.len(), 1);
}

#[tokio::test]
async fn scheduled_reservation_blocks_overlapping_windows() {
    let svc = service();
    let vehicle = seed_vehicle(&svc).await;
    let customer = seed_customer(&svc).await;

    let reservation = svc
        .execute(CreateReservation {
            customer_id: customer.id,
            vehicle_id: vehicle.id,
            start: dt("2026-08-01T10:00:00Z"),
            end: dt("2026-08-03T10:00:00Z"),
            notes: None,
        })
        .await
        .unwrap();
    svc.execute(ApproveReservation {
        reservation_id: reservation.id,
    })
    .await
    .unwrap();

    let err = svc
        .execute(CreatePortalReservation {
            vehicle_id: vehicle.id,
            start: dt("2026-08-02T09:00:00Z"),
            end: dt("2026-08-04T09:00:00Z"),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        create_portal_reservation::ExecutionError::VehicleUnavailable(_),
    ));

    // Half-open windows: renting right at the previous return is fine.
    svc.execute(CreatePortalReservation {
        vehicle_id: vehicle.id,
        start: dt("2026-08-03T10:00:00Z"),
        end: dt("2026-08-04T10:00:00Z"),
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn inverted_interval_is_rejected() {
    let svc = service();
    let vehicle = seed_vehicle(&svc).await;

    let err = svc
        .execute(CreatePortalReservation {
            vehicle_id: vehicle.id,
            start: dt("2026-08-02T10:00:00Z"),
            end: dt("2026-08-01T10:00:00Z"),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err.as_ref(),
        create_portal_reservation::ExecutionError::InvalidInterval,
    ));
}

#[tokio::test]
async fn portal_token_is_single_use() {
    let svc = service();
    let vehicle = seed_vehicle(&svc).await;

    let reservation = svc
        .execute(CreatePortalReservation {
            vehicle_id: vehicle.id,
            start: dt("2026-08-01T10:00:00Z"),
            end: dt("2026-08-02T10:00:00Z"),
        })
        .await
        .unwrap();
    let token = reservation.portal_token.clone().unwrap();

    let submit = |token| SubmitCustomerDetails {
        token,
        name: customer::Name::new("Jan Novák").unwrap(),
        phone: None,
        email: None,
        license_number: customer::LicenseNumber::new("ED123456").unwrap(),
        license_image: image::Bytes::new(vec![0xFF, 0xD8]),
    };

    svc.execute(submit(token.clone())).await.unwrap();
    let err = svc.execute(submit(token)).await.unwrap_err();

    assert!(matches!(
        err.as_ref(),
        submit_customer_details::ExecutionError::InvalidTokenState,
    ));
}

#[tokio::test]
async fn rejection_deletes_the_reservation_and_its_contract() {
    let svc = service();
    let vehicle = seed_vehicle(&svc).await;
    let customer = seed_customer(&svc).await;

    let reservation = svc
        .execute(CreateReservation {
            customer_id: customer.id,
            vehicle_id: vehicle.id,
            start: dt("2026-08-01T10:00:00Z"),
            end: dt("2026-08-02T10:00:00Z"),
            notes: None,
        })
        .await
        .unwrap();
    svc.execute(ApproveReservation {
        reservation_id: reservation.id,
    })
    .await
    .unwrap();

    svc.execute(RejectReservation {
        reservation_id: reservation.id,
    })
    .await
    .unwrap();

    assert!(reservation_by_id(&svc, reservation.id).await.is_none());
    let contract = svc
        .database()
        .execute(Select(
            By::<Option<service::domain::Contract>, _>::new(reservation.id),
        ))
        .await
        .unwrap();
    assert!(contract.is_none());

    // The window is free again.
    svc.execute(CreatePortalReservation {
        vehicle_id: vehicle.id,
        start: dt("2026-08-01T10:00:00Z"),
        end: dt("2026-08-02T10:00:00Z"),
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn activation_guards_reject_bad_input() {
    let svc = service();
    let vehicle = seed_vehicle(&svc).await;
    let customer = seed_customer(&svc).await;

    let reservation = svc
        .execute(CreateReservation {
            customer_id: customer.id,
            vehicle_id: vehicle.id,
            start: dt("2026-08-01T10:00:00Z"),
            end: dt("2026-08-02T10:00:00Z"),
            notes: None,
        })
        .await
        .unwrap();
    svc.execute(ApproveReservation {
        reservation_id: reservation.id,
    })
    .await
    .unwrap();

    let err = svc
        .execute(ActivateReservation {
            reservation_id: reservation.id,
            odometer: Mileage::from(50_000),
            signature: image::Bytes::new(vec![]),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        activate_reservation::ExecutionError::MissingSignature,
    ));

    let err = svc
        .execute(ActivateReservation {
            reservation_id: reservation.id,
            odometer: Mileage::from(49_999),
            signature: image::Bytes::new(vec![0x89]),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        activate_reservation::ExecutionError::InvalidMileage { .. },
    ));

    // Failed activations must leave the reservation scheduled.
    let unchanged = reservation_by_id(&svc, reservation.id).await.unwrap();
    assert_eq!(unchanged.status, Status::Scheduled);
}

#[tokio::test]
async fn activation_fails_once_the_vehicle_is_withdrawn() {
    let svc = service();
    let vehicle = seed_vehicle(&svc).await;
    let customer = seed_customer(&svc).await;

    let reservation = svc
        .execute(CreateReservation {
            customer_id: customer.id,
            vehicle_id: vehicle.id,
            start: dt("2026-08-01T10:00:00Z"),
            end: dt("2026-08-02T10:00:00Z"),
            notes: None,
        })
        .await
        .unwrap();
    svc.execute(ApproveReservation {
        reservation_id: reservation.id,
    })
    .await
    .unwrap();

    // The vehicle goes to the garage between approval and departure.
    let mut withdrawn = vehicle.clone();
    withdrawn.status = vehicle::Status::Maintenance;
    svc.database().execute(Update(withdrawn)).await.unwrap();

    let err = svc
        .execute(ActivateReservation {
            reservation_id: reservation.id,
            odometer: Mileage::from(50_000),
            signature: image::Bytes::new(vec![0x89]),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        activate_reservation::ExecutionError::VehicleUnavailable(_),
    ));

    let unchanged = reservation_by_id(&svc, reservation.id).await.unwrap();
    assert_eq!(unchanged.status, Status::Scheduled);
    assert_eq!(unchanged.start_mileage, None);
    let garage = svc
        .database()
        .execute(Select(By::<Option<Vehicle>, _>::new(vehicle.id)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(garage.status, vehicle::Status::Maintenance);
    assert_eq!(garage.mileage, Mileage::from(50_000));
}

#[tokio::test]
async fn completion_guards_reject_bad_input() {
    let svc = service();
    let vehicle = seed_vehicle(&svc).await;
    let customer = seed_customer(&svc).await;

    let reservation = svc
        .execute(CreateReservation {
            customer_id: customer.id,
            vehicle_id: vehicle.id,
            start: dt("2026-08-01T10:00:00Z"),
            end: dt("2026-08-02T10:00:00Z"),
            notes: None,
        })
        .await
        .unwrap();
    svc.execute(ApproveReservation {
        reservation_id: reservation.id,
    })
    .await
    .unwrap();
    svc.execute(ActivateReservation {
        reservation_id: reservation.id,
        odometer: Mileage::from(50_000),
        signature: image::Bytes::new(vec![0x89]),
    })
    .await
    .unwrap();

    let complete = |odometer, checklist| CompleteReservation {
        reservation_id: reservation.id,
        odometer,
        signature: image::Bytes::new(vec![0x89]),
        checklist,
        damages: vec![],
        refueling_cost: None,
        deposit_forfeited: false,
        notes: None,
    };

    let err = svc
        .execute(complete(Mileage::from(50_400), None))
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        complete_reservation::ExecutionError::IncompleteChecklist,
    ));

    let err = svc
        .execute(complete(Mileage::from(49_000), Some(checklist())))
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        complete_reservation::ExecutionError::InvalidMileage { .. },
    ));

    let err = svc
        .execute(CompleteReservation {
            reservation_id: reservation.id,
            odometer: Mileage::from(50_400),
            signature: image::Bytes::new(vec![0x89]),
            checklist: Some(checklist()),
            damages: vec![],
            refueling_cost: Some(Money::new(
                Decimal::from(-50),
                Currency::Czk,
            )),
            deposit_forfeited: false,
            notes: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        complete_reservation::ExecutionError::InvalidRefuelingCost(_),
    ));

    // Failed completions must leave the reservation active.
    let unchanged = reservation_by_id(&svc, reservation.id).await.unwrap();
    assert_eq!(unchanged.status, Status::Active);
}

#[tokio::test]
async fn reported_damage_and_fees_extend_the_settlement() {
    let svc = service();
    let vehicle = seed_vehicle(&svc).await;
    let customer = seed_customer(&svc).await;

    let reservation = svc
        .execute(CreateReservation {
            customer_id: customer.id,
            vehicle_id: vehicle.id,
            start: dt("2026-08-01T10:00:00Z"),
            end: dt("2026-08-02T10:00:00Z"),
            notes: None,
        })
        .await
        .unwrap();
    svc.execute(ApproveReservation {
        reservation_id: reservation.id,
    })
    .await
    .unwrap();
    svc.execute(ActivateReservation {
        reservation_id: reservation.id,
        odometer: Mileage::from(50_000),
        signature: image::Bytes::new(vec![0x89]),
    })
    .await
    .unwrap();

    let completion = svc
        .execute(CompleteReservation {
            reservation_id: reservation.id,
            odometer: Mileage::from(50_200),
            signature: image::Bytes::new(vec![0x89]),
            checklist: Some(checklist()),
            damages: vec![complete_reservation::ReportedDamage {
                description: service::domain::damage::Description::new(
                    "Scratched bumper",
                )
                .unwrap(),
                location: service::domain::damage::Location::new("Rear left")
                    .unwrap(),
                photo: Some(image::Bytes::new(vec![0xFF])),
            }],
            refueling_cost: Some(czk(700)),
            deposit_forfeited: true,
            notes: None,
        })
        .await
        .unwrap();

    assert_eq!(completion.transactions.len(), 3);
    assert!(completion.protocol.text.to_string().contains("Rear left"));

    let damages = svc
        .database()
        .execute(Select(
            By::<Vec<service::domain::VehicleDamage>, _>::new(vehicle.id),
        ))
        .await
        .unwrap();
    assert_eq!(damages.len(), 1);
    assert_eq!(damages[0].reservation_id, Some(reservation.id));
    assert!(damages[0].photo.is_some());
}
