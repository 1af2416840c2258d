//! Rental settlement recording.

use common::{DateTime, Money};

use crate::{
    domain::{
        transaction::{self, Description, Kind},
        FinancialTransaction, Reservation,
    },
    pricing::Quote,
};

/// Builds the ledger entries settling a completed [`Reservation`].
///
/// Always yields one income entry for the rental total. A refueling expense
/// is added when staff paid a non-zero amount to refuel the returned vehicle,
/// and a forfeited deposit becomes extra income when the deposit was withheld
/// from the customer.
///
/// Entries are append-only: once recorded, they are never updated or deleted.
#[expect(clippy::missing_panics_doc, reason = "infallible")]
#[must_use]
pub fn record(
    reservation: &Reservation,
    quote: &Quote,
    refueling_cost: Option<Money>,
    deposit_forfeited: bool,
    deposit: Money,
    now: DateTime,
) -> Vec<FinancialTransaction> {
    let entry = |kind, amount, description: String| FinancialTransaction {
        id: transaction::Id::new(),
        kind,
        amount,
        date: now.coerce(),
        description: Description::new(description)
            .expect("settlement description is non-empty"),
        reservation_id: Some(reservation.id),
    };

    let mut entries = vec![entry(
        Kind::Income,
        quote.total,
        format!("Rental income for reservation {}", reservation.id),
    )];

    if let Some(cost) = refueling_cost.filter(|cost| !cost.amount.is_zero()) {
        entries.push(entry(
            Kind::Expense,
            cost,
            format!("Refueling after reservation {}", reservation.id),
        ));
    }

    if deposit_forfeited {
        entries.push(entry(
            Kind::Income,
            deposit,
            format!("Forfeited deposit for reservation {}", reservation.id),
        ));
    }

    entries
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, DateTime, Money};
    use rust_decimal::Decimal;

    use crate::{
        domain::{
            reservation::{self, Period, Status},
            transaction::Kind,
            vehicle, Reservation,
        },
        pricing::Quote,
    };

    use super::record;

    fn dt(s: &str) -> DateTime {
        DateTime::from_rfc3339(s).unwrap()
    }

    fn czk(amount: u32) -> Money {
        Money::new(Decimal::from(amount), Currency::Czk)
    }

    fn reservation() -> Reservation {
        Reservation {
            id: reservation::Id::new(),
            customer_id: None,
            vehicle_id: vehicle::Id::new(),
            period: Period::new(
                dt("2026-08-01T10:00:00Z"),
                dt("2026-08-02T10:00:00Z"),
            )
            .unwrap(),
            status: Status::Completed,
            start_mileage: None,
            end_mileage: None,
            notes: None,
            portal_token: None,
            created_at: dt("2026-07-01T00:00:00Z").coerce(),
        }
    }

    fn quote() -> Quote {
        Quote {
            base: czk(1500),
            km_limit: 300,
            km_over: 100,
            overage: czk(300),
            total: czk(1800),
        }
    }

    #[test]
    fn plain_settlement_yields_a_single_income_entry() {
        let r = reservation();

        let entries = record(
            &r,
            &quote(),
            None,
            false,
            czk(5000),
            dt("2026-08-02T10:00:00Z"),
        );

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, Kind::Income);
        assert_eq!(entries[0].amount, czk(1800));
        assert_eq!(entries[0].reservation_id, Some(r.id));
        assert!(entries[0]
            .description
            .to_string()
            .starts_with("Rental income"));
    }

    #[test]
    fn zero_refueling_cost_adds_no_expense_entry() {
        let r = reservation();

        let entries = record(
            &r,
            &quote(),
            Some(czk(0)),
            false,
            czk(5000),
            dt("2026-08-02T10:00:00Z"),
        );

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, Kind::Income);
    }

    #[test]
    fn refueling_and_forfeited_deposit_add_their_entries() {
        let r = reservation();

        let entries = record(
            &r,
            &quote(),
            Some(czk(700)),
            true,
            czk(5000),
            dt("2026-08-02T10:00:00Z"),
        );

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].kind, Kind::Expense);
        assert_eq!(entries[1].amount, czk(700));
        assert_eq!(entries[2].kind, Kind::Income);
        assert_eq!(entries[2].amount, czk(5000));
    }
}
