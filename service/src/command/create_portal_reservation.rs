//! [`Command`] for creating a new self-service [`Reservation`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    availability,
    domain::{
        reservation::{self, Period, Status, Token},
        vehicle, Reservation, Vehicle,
    },
    infra::{database, Database},
    read::reservation::Open,
    Service,
};

use super::Command;

/// [`Command`] for creating a new self-service [`Reservation`].
///
/// The created [`Reservation`] is [`Status::PendingCustomer`] and carries a
/// freshly generated portal [`Token`] for the customer to submit their
/// details with.
#[derive(Clone, Copy, Debug)]
pub struct CreatePortalReservation {
    /// ID of the [`Vehicle`] to book.
    pub vehicle_id: vehicle::Id,

    /// [`DateTime`] when the rental starts.
    pub start: DateTime,

    /// [`DateTime`] when the rental ends (exclusive).
    pub end: DateTime,
}

impl<Db, St> Command<CreatePortalReservation> for Service<Db, St>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
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
        cmd: CreatePortalReservation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreatePortalReservation {
            vehicle_id,
            start,
            end,
        } = cmd;

        let period = Period::new(start, end)
            .ok_or(E::InvalidInterval)
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
            customer_id: None,
            vehicle_id,
            period,
            status: Status::PendingCustomer,
            start_mileage: None,
            end_mileage: None,
            notes: None,
            portal_token: Some(Token::generate()),
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

/// Error of [`CreatePortalReservation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
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
