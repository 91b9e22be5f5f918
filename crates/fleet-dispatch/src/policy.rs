//! The assignment policy trait — the extension point for dispatch strategy.

use fleet_core::{OrderId, VehicleId};

use crate::DispatchContext;

/// One order paired with the vehicle chosen for it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Assignment {
    pub order:   OrderId,
    pub vehicle: VehicleId,
    pub score:   f64,
}

/// Pluggable dispatch strategy.
///
/// A policy only reads; the [`Dispatcher`][crate::Dispatcher] applies what it
/// returns.  A plan may leave orders unassigned but must not name any vehicle
/// or order twice.
pub trait AssignmentPolicy: Send + Sync {
    fn plan(&self, ctx: &DispatchContext<'_>) -> Vec<Assignment>;
}
