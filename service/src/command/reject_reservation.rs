//! [`Command`] for rejecting a [`Reservation`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{reservation, vehicle, Contract, Reservation, Vehicle},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for rejecting a [`Reservation`] that hasn't been activated.
///
/// The [`Reservation`] and its drafted [`Contract`] are deleted outright:
/// rejected bookings leave no trace in the dataset.
#[derive(Clone, Copy, Debug)]
pub struct RejectReservation {
    /// ID of the [`Reservation`] to reject.
    pub reservation_id: reservation::Id,
}

impl<Db, St> Command<RejectReservation> for Service<Db, St>
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
            Delete<By<Contract, reservation::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Reservation, reservation::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RejectReservation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RejectReservation { reservation_id } = cmd;

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

        let reservation = tx
            .execute(Select(By::<Option<Reservation>, _>::new(reservation_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReservationNotExists(reservation_id))
            .map_err(tracerr::wrap!())?;

        if !reservation.status.is_pre_activation() {
            return Err(tracerr::new!(E::ReservationNotRejectable(
                reservation_id
            )));
        }

        tx.execute(Delete(By::<Contract, _>::new(reservation_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Delete(By::<Reservation, _>::new(reservation_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(())
    }
}

/// Error of [`RejectReservation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Reservation`] with the provided ID does not exist.
    #[display("`Reservation(id: {_0})` does not exist")]
    ReservationNotExists(#[error(not(source))] reservation::Id),

    /// [`Reservation`] has already been activated.
    #[display("`Reservation(id: {_0})` is already activated")]
    ReservationNotRejectable(#[error(not(source))] reservation::Id),
}
