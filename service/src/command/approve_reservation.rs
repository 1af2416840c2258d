//! [`Command`] for approving a [`Reservation`].

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    availability, document,
    domain::{
        contract, customer,
        reservation::{self, Status},
        vehicle, Contract, Customer, Reservation, Vehicle,
    },
    infra::{database, Database},
    pricing,
    read::reservation::Open,
    Service,
};

use super::Command;

/// [`Command`] for approving a [`Reservation`] awaiting approval.
///
/// Re-checks availability under the [`Vehicle`] lock, advances the
/// [`Reservation`] to [`Status::Scheduled`] and drafts its rental
/// [`Contract`] in one transaction.
#[derive(Clone, Copy, Debug)]
pub struct ApproveReservation {
    /// ID of the [`Reservation`] to approve.
    pub reservation_id: reservation::Id,
}

impl<Db, St> Command<ApproveReservation> for Service<Db, St>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Reservation>, reservation::Id>>,
            Ok = Option<Reservation>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Vehicle, vehicle::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Reservation>, reservation::Id>>,
            Ok = Option<Reservation>,
            Err = Traced<database::Error>,
        > + Database<
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
        > + Database<Insert<Contract>, Err = Traced<database::Error>>
        + Database<Update<Reservation>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Contract;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ApproveReservation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ApproveReservation { reservation_id } = cmd;

        let reservation = self
            .database()
            .execute(Select(By::<Option<Reservation>, _>::new(reservation_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReservationNotExists(reservation_id))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Vehicle`.
        tx.execute(Lock(By::new(reservation.vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut reservation = tx
            .execute(Select(By::<Option<Reservation>, _>::new(reservation_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReservationNotExists(reservation_id))
            .map_err(tracerr::wrap!())?;

        let customer_id = reservation
            .customer_id
            .ok_or(E::CustomerMissing(reservation_id))
            .map_err(tracerr::wrap!())?;
        let customer = tx
            .execute(Select(By::<Option<Customer>, _>::new(customer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CustomerMissing(reservation_id))
            .map_err(tracerr::wrap!())?;

        let vehicle = tx
            .execute(Select(By::<Option<Vehicle>, _>::new(
                reservation.vehicle_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(reservation.vehicle_id))
            .map_err(tracerr::wrap!())?;

        let open = tx
            .execute(Select(By::<Vec<Open<Reservation>>, _>::new(vehicle.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !availability::is_available_except(
            &vehicle,
            &reservation.period,
            reservation.id,
            open.iter().map(|Open(r)| r),
        ) {
            tracing::warn!(
                vehicle_id = %vehicle.id,
                reservation_id = %reservation.id,
                "booking window taken before approval",
            );
            return Err(tracerr::new!(E::VehicleUnavailable(vehicle.id)));
        }

        reservation
            .advance(Status::Scheduled)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let base_price = pricing::base_price(
            &vehicle.rates,
            reservation.period.duration(),
        );
        let contract = Contract {
            id: contract::Id::new(),
            reservation_id: reservation.id,
            text: document::contract::draft(
                &customer,
                &vehicle,
                &reservation,
                base_price,
                &self.config().pricing,
            ),
            created_at: self.clock().now().coerce(),
            signed_at: None,
        };

        tx.execute(Insert(contract.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Update(reservation))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(contract)
    }
}

/// Error of [`ApproveReservation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Reservation`] has no [`Customer`] attached.
    #[display("`Reservation(id: {_0})` has no customer on file")]
    CustomerMissing(#[error(not(source))] reservation::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Reservation`] with the provided ID does not exist.
    #[display("`Reservation(id: {_0})` does not exist")]
    ReservationNotExists(#[error(not(source))] reservation::Id),

    /// [`Reservation`] is not awaiting approval.
    #[display("{_0}")]
    #[from]
    Transition(reservation::TransitionError),

    /// [`Vehicle`] is no longer available over the reserved [`Period`].
    ///
    /// [`Period`]: crate::domain::reservation::Period
    #[display("`Vehicle(id: {_0})` is unavailable over the reserved period")]
    VehicleUnavailable(#[error(not(source))] vehicle::Id),

    /// [`Vehicle`] with the provided ID does not exist.
    #[display("`Vehicle(id: {_0})` does not exist")]
    VehicleNotExists(#[error(not(source))] vehicle::Id),
}
