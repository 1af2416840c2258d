//! [`Query`] resolving availability of a [`Vehicle`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    availability,
    domain::{reservation::Period, vehicle, Reservation, Vehicle},
    infra::{database, Database},
    read::reservation::Open,
    Service,
};

use super::Query;

/// [`Query`] resolving whether a [`Vehicle`] is available for rent over a
/// [`Period`].
#[derive(Clone, Copy, Debug)]
pub struct VehicleAvailability {
    /// ID of the [`Vehicle`] to check.
    pub vehicle_id: vehicle::Id,

    /// Requested rental [`Period`].
    pub period: Period,
}

impl<Db, St> Query<VehicleAvailability> for Service<Db, St>
where
    Db: Database<
            Select<By<Option<Vehicle>, vehicle::Id>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Open<Reservation>>, vehicle::Id>>,
            Ok = Vec<Open<Reservation>>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = bool;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: VehicleAvailability,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let VehicleAvailability { vehicle_id, period } = query;

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

        Ok(availability::is_available(
            &vehicle,
            &period,
            open.iter().map(|Open(r)| r),
        ))
    }
}

/// Error of [`VehicleAvailability`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Vehicle`] with the provided ID does not exist.
    #[display("`Vehicle(id: {_0})` does not exist")]
    VehicleNotExists(#[error(not(source))] vehicle::Id),
}
