//! [`Command`] for submitting [`Customer`] details via the portal.

use common::operations::{
    By, Commit, Insert, Lock, Perform, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        customer, image,
        reservation::{self, Status, Token},
        vehicle, Customer, Reservation, Vehicle,
    },
    infra::{database, storage, Database, Storage},
    Service,
};

use super::Command;

/// [`Command`] for submitting [`Customer`] details against a portal
/// [`Token`].
///
/// Consumes the [`Token`]: a successful submission clears it from the
/// [`Reservation`], so replaying the same [`Token`] fails.
#[derive(Clone, Debug)]
pub struct SubmitCustomerDetails {
    /// Portal [`Token`] of the [`Reservation`] being filled in.
    pub token: Token,

    /// Full name of the [`Customer`].
    pub name: customer::Name,

    /// Phone number of the [`Customer`].
    pub phone: Option<customer::Phone>,

    /// Email address of the [`Customer`].
    pub email: Option<customer::Email>,

    /// Driving license number of the [`Customer`].
    pub license_number: customer::LicenseNumber,

    /// Photo of the driving license.
    pub license_image: image::Bytes,
}

impl<Db, St> Command<SubmitCustomerDetails> for Service<Db, St>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Reservation>, Token>>,
            Ok = Option<Reservation>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Vehicle, vehicle::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Reservation>, Token>>,
            Ok = Option<Reservation>,
            Err = Traced<database::Error>,
        > + Database<Insert<Customer>, Err = Traced<database::Error>>
        + Database<Update<Reservation>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    St: Storage<
        Perform<image::Upload>,
        Ok = image::Ref,
        Err = Traced<storage::Error>,
    >,
{
    type Ok = Reservation;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SubmitCustomerDetails,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitCustomerDetails {
            token,
            name,
            phone,
            email,
            license_number,
            license_image,
        } = cmd;

        self.database()
            .execute(Select(By::<Option<Reservation>, _>::new(token.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::InvalidTokenState)
            .map_err(tracerr::wrap!())
            .map(drop)?;

        // The image store is append-only, so uploading before the
        // transaction cannot corrupt anything if the command fails later.
        let license_image = self
            .storage()
            .execute(Perform(image::Upload(license_image)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut reservation = tx
            .execute(Select(By::<Option<Reservation>, _>::new(token.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::InvalidTokenState)
            .map_err(tracerr::wrap!())?;

        // Avoid concurrent actions upon the same `Vehicle`.
        tx.execute(Lock(By::new(reservation.vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        // Re-read after taking the lock: the token may have been consumed
        // concurrently.
        let fresh = tx
            .execute(Select(By::<Option<Reservation>, _>::new(token)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::InvalidTokenState)
            .map_err(tracerr::wrap!())?;
        reservation = fresh;

        let customer = Customer {
            id: customer::Id::new(),
            name,
            phone,
            email,
            license_number,
            license_image: Some(license_image),
            created_at: self.clock().now().coerce(),
        };

        reservation.customer_id = Some(customer.id);
        reservation
            .advance(Status::PendingApproval)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        reservation.portal_token = None;

        tx.execute(Insert(customer))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Update(reservation.clone()))
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

/// Error of [`SubmitCustomerDetails`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Portal [`Token`] doesn't resolve to any open [`Reservation`].
    #[display("portal token is unknown or already consumed")]
    InvalidTokenState,

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Storage(storage::Error),

    /// [`Reservation`] is not awaiting customer details.
    #[display("{_0}")]
    #[from]
    Transition(reservation::TransitionError),
}
