//! [`Command`] for activating a [`Reservation`] at vehicle departure.

use common::operations::{
    By, Commit, Insert, Lock, Perform, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    availability, document,
    domain::{
        contract, customer, image,
        protocol::{self, Kind},
        reservation::{self, Status},
        vehicle::{self, Mileage},
        Contract, Customer, HandoverProtocol, Reservation, Vehicle,
    },
    infra::{database, storage, Database, Storage},
    read::reservation::Open,
    Service,
};

use super::Command;

/// [`Command`] for activating a scheduled [`Reservation`]: the vehicle
/// physically departs to the customer.
///
/// Signs the drafted [`Contract`] with the captured customer signature,
/// records the signed departure [`HandoverProtocol`] and marks the
/// [`Vehicle`] as rented, all in one transaction.
#[derive(Clone, Debug)]
pub struct ActivateReservation {
    /// ID of the [`Reservation`] to activate.
    pub reservation_id: reservation::Id,

    /// Odometer reading of the [`Vehicle`] at departure.
    pub odometer: Mileage,

    /// Captured customer signature image.
    pub signature: image::Bytes,
}

impl<Db, St> Command<ActivateReservation> for Service<Db, St>
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
            Select<By<Option<Contract>, reservation::Id>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Open<Reservation>>, vehicle::Id>>,
            Ok = Vec<Open<Reservation>>,
            Err = Traced<database::Error>,
        > + Database<Insert<HandoverProtocol>, Err = Traced<database::Error>>
        + Database<Update<Contract>, Err = Traced<database::Error>>
        + Database<Update<Reservation>, Err = Traced<database::Error>>
        + Database<Update<Vehicle>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    St: Storage<
        Perform<image::Upload>,
        Ok = image::Ref,
        Err = Traced<storage::Error>,
    >,
{
    type Ok = HandoverProtocol;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ActivateReservation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ActivateReservation {
            reservation_id,
            odometer,
            signature,
        } = cmd;

        if signature.is_empty() {
            return Err(tracerr::new!(E::MissingSignature));
        }

        self.database()
            .execute(Select(By::<Option<Reservation>, _>::new(reservation_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReservationNotExists(reservation_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        // The image store is append-only, so uploading before the
        // transaction cannot corrupt anything if the command fails later.
        let signature = self
            .storage()
            .execute(Perform(image::Upload(signature)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut reservation = tx
            .execute(Select(By::<Option<Reservation>, _>::new(reservation_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReservationNotExists(reservation_id))
            .map_err(tracerr::wrap!())?;

        // Avoid concurrent actions upon the same `Vehicle`.
        tx.execute(Lock(By::new(reservation.vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        reservation = tx
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

        let mut vehicle = tx
            .execute(Select(By::<Option<Vehicle>, _>::new(
                reservation.vehicle_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(reservation.vehicle_id))
            .map_err(tracerr::wrap!())?;

        let mut contract = tx
            .execute(Select(By::<Option<Contract>, _>::new(reservation_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ContractMissing(reservation_id))
            .map_err(tracerr::wrap!())?;

        if odometer.distance_since(vehicle.mileage).is_none() {
            return Err(tracerr::new!(E::InvalidMileage {
                odometer,
                current: vehicle.mileage,
            }));
        }

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
                "booking window taken before activation",
            );
            return Err(tracerr::new!(E::VehicleUnavailable(vehicle.id)));
        }

        reservation
            .advance(Status::Active)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let now = self.clock().now();

        let signed = document::sign(contract.text.as_ref(), &signature)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        contract.text = contract::Text::new(signed)
            .ok_or(E::Sign(document::SignError::PlaceholderNotFound))
            .map_err(tracerr::wrap!())?;
        contract.signed_at = Some(now.coerce());

        let rendered = document::protocol::render(
            Kind::Departure,
            &customer,
            &vehicle,
            &reservation,
            odometer,
            None,
            &[],
            reservation.notes.as_ref(),
        );
        let signed = document::sign(rendered.as_ref(), &signature)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let handover = HandoverProtocol {
            id: protocol::Id::new(),
            reservation_id: reservation.id,
            kind: Kind::Departure,
            odometer,
            text: protocol::Text::new(signed)
                .ok_or(E::Sign(document::SignError::PlaceholderNotFound))
                .map_err(tracerr::wrap!())?,
            signature,
            created_at: now.coerce(),
        };

        reservation.start_mileage = Some(odometer);
        vehicle.mileage = odometer;
        vehicle.status = vehicle::Status::Rented;

        tx.execute(Insert(handover.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Update(contract))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Update(reservation))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Update(vehicle))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(handover)
    }
}

/// Error of [`ActivateReservation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Reservation`] has no drafted [`Contract`].
    #[display("`Reservation(id: {_0})` has no drafted contract")]
    ContractMissing(#[error(not(source))] reservation::Id),

    /// [`Reservation`] has no [`Customer`] attached.
    #[display("`Reservation(id: {_0})` has no customer on file")]
    CustomerMissing(#[error(not(source))] reservation::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Reported odometer reading is behind the [`Vehicle`]'s current one.
    #[display(
        "odometer reading {odometer} is behind the current reading {current}"
    )]
    InvalidMileage {
        /// Reported odometer reading.
        odometer: Mileage,

        /// Current odometer reading of the [`Vehicle`].
        current: Mileage,
    },

    /// No customer signature was captured.
    #[display("no customer signature was captured")]
    MissingSignature,

    /// [`Reservation`] with the provided ID does not exist.
    #[display("`Reservation(id: {_0})` does not exist")]
    ReservationNotExists(#[error(not(source))] reservation::Id),

    /// Document signing error.
    #[display("cannot sign document: {_0}")]
    #[from]
    Sign(document::SignError),

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Storage(storage::Error),

    /// [`Reservation`] is not scheduled for departure.
    #[display("{_0}")]
    #[from]
    Transition(reservation::TransitionError),

    /// [`Vehicle`] is no longer available over the reserved period.
    #[display("`Vehicle(id: {_0})` is unavailable over the reserved period")]
    VehicleUnavailable(#[error(not(source))] vehicle::Id),

    /// [`Vehicle`] with the provided ID does not exist.
    #[display("`Vehicle(id: {_0})` does not exist")]
    VehicleNotExists(#[error(not(source))] vehicle::Id),
}
