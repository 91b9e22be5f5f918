use fleet_core::{FleetError, VehicleId};
use thiserror::Error;

use crate::VehicleStatus;

#[derive(Debug, Error)]
pub enum VehicleError {
    #[error("vehicle {0} not found")]
    NotFound(VehicleId),

    #[error("vehicle {0} is not available for a new job")]
    Busy(VehicleId),

    #[error("vehicle {vehicle} carries {cargo} units but holds {capacity}")]
    OverCapacity { vehicle: VehicleId, cargo: u32, capacity: u32 },

    #[error("vehicle {vehicle} fuel {fuel} outside [0, {tank}]")]
    FuelOutOfRange { vehicle: VehicleId, fuel: f32, tank: f32 },

    #[error("vehicle {vehicle} maintenance {level} outside [0, 100]")]
    MaintenanceOutOfRange { vehicle: VehicleId, level: f32 },

    #[error("vehicle {vehicle} is {status} with no target")]
    MissingTarget { vehicle: VehicleId, status: VehicleStatus },

    #[error("vehicle {0} carries cargo without a job")]
    CargoWithoutJob(VehicleId),

    #[error(transparent)]
    Core(#[from] FleetError),
}

pub type VehicleResult<T> = Result<T, VehicleError>;
