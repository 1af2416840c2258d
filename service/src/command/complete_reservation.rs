//! [`Command`] for completing a [`Reservation`] at vehicle return.

use common::{
    operations::{
        By, Commit, Insert, Lock, Perform, Select, Transact, Transacted,
        Update,
    },
    Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    document,
    domain::{
        customer, damage, image,
        protocol::{self, Checklist, Kind},
        reservation::{self, Notes, Status},
        vehicle::{self, Mileage},
        Customer, FinancialTransaction, HandoverProtocol, Reservation,
        Vehicle, VehicleDamage,
    },
    infra::{database, storage, Database, Storage},
    pricing::{self, Quote},
    settlement, Service,
};

use super::Command;

/// [`Command`] for completing an active [`Reservation`]: the vehicle returns
/// from the customer.
///
/// Prices the rental with the mileage overage, records the signed return
/// [`HandoverProtocol`], reported damages and the settlement ledger entries,
/// and releases the [`Vehicle`], all in one transaction.
#[derive(Clone, Debug)]
pub struct CompleteReservation {
    /// ID of the [`Reservation`] to complete.
    pub reservation_id: reservation::Id,

    /// Odometer reading of the [`Vehicle`] at return.
    pub odometer: Mileage,

    /// Captured customer signature image.
    pub signature: image::Bytes,

    /// Filled return inspection [`Checklist`].
    pub checklist: Option<Checklist>,

    /// Damages found on the returned [`Vehicle`].
    pub damages: Vec<ReportedDamage>,

    /// Cost of refueling the returned [`Vehicle`] paid by staff, if any.
    pub refueling_cost: Option<Money>,

    /// Whether the deposit was withheld from the customer.
    pub deposit_forfeited: bool,

    /// Optional staff [`Notes`] for the return protocol.
    pub notes: Option<Notes>,
}

/// Damage reported on the returned [`Vehicle`] during inspection.
#[derive(Clone, Debug)]
pub struct ReportedDamage {
    /// Description of the damage.
    pub description: damage::Description,

    /// Location of the damage on the [`Vehicle`].
    pub location: damage::Location,

    /// Photo of the damage, if captured.
    pub photo: Option<image::Bytes>,
}

/// Outcome of a [`CompleteReservation`] [`Command`].
#[derive(Clone, Debug)]
pub struct Completion {
    /// Final price breakdown of the rental.
    pub quote: Quote,

    /// Recorded return [`HandoverProtocol`].
    pub protocol: HandoverProtocol,

    /// Recorded settlement ledger entries.
    pub transactions: Vec<FinancialTransaction>,
}

impl<Db, St> Command<CompleteReservation> for Service<Db, St>
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
            Select<By<Vec<VehicleDamage>, vehicle::Id>>,
            Ok = Vec<VehicleDamage>,
            Err = Traced<database::Error>,
        > + Database<Insert<HandoverProtocol>, Err = Traced<database::Error>>
        + Database<Insert<VehicleDamage>, Err = Traced<database::Error>>
        + Database<Insert<FinancialTransaction>, Err = Traced<database::Error>>
        + Database<Update<Reservation>, Err = Traced<database::Error>>
        + Database<Update<Vehicle>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    St: Storage<
        Perform<image::Upload>,
        Ok = image::Ref,
        Err = Traced<storage::Error>,
    >,
{
    type Ok = Completion;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CompleteReservation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CompleteReservation {
            reservation_id,
            odometer,
            signature,
            checklist,
            damages,
            refueling_cost,
            deposit_forfeited,
            notes,
        } = cmd;

        if signature.is_empty() {
            return Err(tracerr::new!(E::MissingSignature));
        }
        let checklist = checklist
            .ok_or(E::IncompleteChecklist)
            .map_err(tracerr::wrap!())?;
        if let Some(cost) = refueling_cost {
            if cost.is_negative() {
                return Err(tracerr::new!(E::InvalidRefuelingCost(cost)));
            }
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
        let mut uploaded = Vec::with_capacity(damages.len());
        for reported in damages {
            let photo = match reported.photo {
                Some(bytes) => Some(
                    self.storage()
                        .execute(Perform(image::Upload(bytes)))
                        .await
                        .map_err(tracerr::map_from_and_wrap!(=> E))?,
                ),
                None => None,
            };
            uploaded.push((reported.description, reported.location, photo));
        }

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

        let start_mileage = reservation
            .start_mileage
            .ok_or(E::StartMileageUnknown(reservation_id))
            .map_err(tracerr::wrap!())?;
        // A returned vehicle has always been driven, so an odometer reading
        // equal to the departure one is as suspicious as a lower one.
        let distance = odometer
            .distance_since(start_mileage)
            .filter(|km| *km > 0)
            .ok_or(E::InvalidMileage {
                odometer,
                current: start_mileage,
            })
            .map_err(tracerr::wrap!())?;

        reservation
            .advance(Status::Completed)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let now = self.clock().now();

        let new_damages = uploaded
            .into_iter()
            .map(|(description, location, photo)| VehicleDamage {
                id: damage::Id::new(),
                vehicle_id: vehicle.id,
                reservation_id: Some(reservation.id),
                description,
                location,
                photo,
                reported_at: now.coerce(),
            })
            .collect::<Vec<_>>();

        let mut known_damages = tx
            .execute(Select(By::<Vec<VehicleDamage>, _>::new(vehicle.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        known_damages.extend(new_damages.iter().cloned());

        let rendered = document::protocol::render(
            Kind::Return,
            &customer,
            &vehicle,
            &reservation,
            odometer,
            Some(&checklist),
            &known_damages,
            notes.as_ref(),
        );
        let signed = document::sign(rendered.as_ref(), &signature)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let handover = HandoverProtocol {
            id: protocol::Id::new(),
            reservation_id: reservation.id,
            kind: Kind::Return,
            odometer,
            text: protocol::Text::new(signed)
                .ok_or(E::Sign(document::SignError::PlaceholderNotFound))
                .map_err(tracerr::wrap!())?,
            signature,
            created_at: now.coerce(),
        };

        let quote = pricing::quote(
            &vehicle.rates,
            reservation.period.duration(),
            distance,
            &self.config().pricing,
        );
        let transactions = settlement::record(
            &reservation,
            &quote,
            refueling_cost,
            deposit_forfeited,
            self.config().pricing.deposit,
            now,
        );
        tracing::debug!(
            reservation_id = %reservation.id,
            total = %quote.total,
            entries = transactions.len(),
            "settling completed rental",
        );

        reservation.end_mileage = Some(odometer);
        vehicle.mileage = odometer;
        vehicle.status = vehicle::Status::Available;

        tx.execute(Insert(handover.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        for damage in new_damages {
            tx.execute(Insert(damage))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }
        for entry in transactions.clone() {
            tx.execute(Insert(entry))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }
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

        Ok(Completion {
            quote,
            protocol: handover,
            transactions,
        })
    }
}

/// Error of [`CompleteReservation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Reservation`] has no [`Customer`] attached.
    #[display("`Reservation(id: {_0})` has no customer on file")]
    CustomerMissing(#[error(not(source))] reservation::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Return inspection [`Checklist`] wasn't filled.
    #[display("return inspection checklist wasn't filled")]
    IncompleteChecklist,

    /// Reported odometer reading is not strictly ahead of the departure
    /// reading.
    #[display(
        "odometer reading {odometer} is not ahead of the departure reading \
         {current}"
    )]
    InvalidMileage {
        /// Reported odometer reading.
        odometer: Mileage,

        /// Odometer reading at departure.
        current: Mileage,
    },

    /// Reported refueling cost is negative.
    #[display("refueling cost {_0} is negative")]
    InvalidRefuelingCost(#[error(not(source))] Money),

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

    /// [`Reservation`] has no departure odometer reading recorded.
    #[display("`Reservation(id: {_0})` has no departure odometer reading")]
    StartMileageUnknown(#[error(not(source))] reservation::Id),

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Storage(storage::Error),

    /// [`Reservation`] is not out with a customer.
    #[display("{_0}")]
    #[from]
    Transition(reservation::TransitionError),

    /// [`Vehicle`] with the provided ID does not exist.
    #[display("`Vehicle(id: {_0})` does not exist")]
    VehicleNotExists(#[error(not(source))] vehicle::Id),
}
