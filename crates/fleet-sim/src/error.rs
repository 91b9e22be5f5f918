use fleet_core::{FleetError, VehicleId};
use fleet_dispatch::DispatchError;
use fleet_grid::GridError;
use fleet_vehicle::VehicleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("vehicle {0} not found")]
    VehicleNotFound(VehicleId),

    #[error("simulation driver has shut down")]
    Disconnected,

    #[error(transparent)]
    Core(#[from] FleetError),

    #[error("grid error: {0}")]
    Grid(#[from] GridError),

    #[error("vehicle error: {0}")]
    Vehicle(#[from] VehicleError),

    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

pub type SimResult<T> = Result<T, SimError>;
