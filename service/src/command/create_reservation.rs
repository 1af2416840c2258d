//! [`Command`] for creating a new [`Reservation`] by staff.

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    availability,
    domain::{
        customer,
        reservation::{self, Notes, Period, Status},
        vehicle, Customer, Reservation, Vehicle,
    },
    infra::{database, Database},
    read::reservation::Open,
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Reservation`] by staff for an existing
/// [`Customer`].
///
/// The created [`Reservation`] is [`Status::PendingApproval`]: the customer
/// details are already on file, so it only awaits approval.
#[derive(Clone, Debug)]
pub struct CreateReservation {
    /// ID of the [`Customer`] the [`Reservation`] is for.
    pub customer_id: customer::Id,

    /// ID of the [`Vehicle`] to book.
    pub vehicle_id: vehicle::Id,

    /// [`DateTime`] when the rental starts.
    pub start: DateTime,

    /// [`DateTime`] when the rental ends (exclusive).
    pub end: DateTime,

    /// Optional staff [`Notes`] about the [`Reservation`].
    pub notes: Option<Notes>,
}

impl<Db, St> Command<CreateReservation> for Service<Db, St>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Customer>, customer::Id>>,
            Ok = Option<Customer>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Vehicle>, vehicle::Id>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Open<Reservation>>, vehicle::Id>>,
            Ok = Vec<Open<Reservation>>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Vehicle, vehicle::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Vehicle>, vehicle::Id>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Open<Reservation>>, vehicle::Id>>,
            Ok = Vec<Open<Reservation>>,
            Err = Traced<database::Error>,
        > + Database<Insert<Reservation>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Reservation;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateReservation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateReservation {
            customer_id,
            vehicle_id,
            start,
            end,
            notes,
        } = cmd;

        let period = Period::new(start, end)
            .ok_or(E::InvalidInterval)
            .map_err(tracerr::wrap!())?;

        let customer = self
            .database()
            .execute(Select(By::<Option<Customer>, _>::new(customer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CustomerNotExists(customer_id))
            .map_err(tracerr::wrap!())?;

        let vehicle = self
            .database()
            .execute(Select(By::<Option<Vehicle>, _>::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(vehicle_id))
            .map_err(tracerr::wrap!())?;

        let open = self
            .database()
            .execute(Select(By::<Vec<Open<Reservation>>, _>::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !availability::is_available(
            &vehicle,
            &period,
            open.iter().map(|Open(r)| r),
        ) {
            return Err(tracerr::new!(E::VehicleUnavailable(vehicle_id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent bookings of the same `Vehicle`.
        tx.execute(Lock(By::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let vehicle = tx
            .execute(Select(By::<Option<Vehicle>, _>::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(vehicle_id))
            .map_err(tracerr::wrap!())?;
        let open = tx
            .execute(Select(By::<Vec<Open<Reservation>>, _>::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !availability::is_available(
            &vehicle,
            &period,
            open.iter().map(|Open(r)| r),
        ) {
            tracing::warn!(
                vehicle_id = %vehicle_id,
                "booking window taken while reserving",
            );
            return Err(tracerr::new!(E::VehicleUnavailable(vehicle_id)));
        }

        let reservation = Reservation {
            id: reservation::Id::new(),
            customer_id: Some(customer.id),
            vehicle_id,
            period,
            status: Status::PendingApproval,
            start_mileage: None,
            end_mileage: None,
            notes,
            portal_token: None,
            created_at: self.clock().now().coerce(),
        };
        tx.execute(Insert(reservation.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(reservation)
    }
}

/// Error of [`CreateReservation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Customer`] with the provided ID does not exist.
    #[display("`Customer(id: {_0})` does not exist")]
    CustomerNotExists(#[error(not(source))] customer::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Requested rental interval is empty or inverted.
    #[display("rental interval is empty or inverted")]
    InvalidInterval,

    /// [`Vehicle`] is not available over the requested [`Period`].
    #[display("`Vehicle(id: {_0})` is unavailable over the requested period")]
    VehicleUnavailable(#[error(not(source))] vehicle::Id),

    /// [`Vehicle`] with the provided ID does not exist.
    #[display("`Vehicle(id: {_0})` does not exist")]
    VehicleNotExists(#[error(not(source))] vehicle::Id),
}
