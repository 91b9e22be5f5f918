use fleet_core::{OrderId, VehicleId};
use fleet_vehicle::VehicleError;
use thiserror::Error;

use crate::OrderStatus;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    #[error("order {order} cannot go from {from} to {to}")]
    InvalidTransition { order: OrderId, from: OrderStatus, to: OrderStatus },

    #[error("plan books vehicle {0} more than once")]
    DoubleBookedVehicle(VehicleId),

    #[error("plan books order {0} more than once")]
    DoubleBookedOrder(OrderId),

    #[error("invalid order request: {0}")]
    InvalidRequest(String),

    #[error("feed parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Vehicle(#[from] VehicleError),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
