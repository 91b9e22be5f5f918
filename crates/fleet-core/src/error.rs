//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `FleetError` as one
//! variant via `#[from]`.

use thiserror::Error;

use crate::{OrderId, VehicleId};

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("vehicle {0} not found")]
    VehicleNotFound(VehicleId),

    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `fleet-core` operations.
pub type FleetResult<T> = Result<T, FleetError>;
