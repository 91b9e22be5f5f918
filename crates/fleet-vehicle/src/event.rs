//! Deltas produced by the vehicle engine for the simulation to apply.

use fleet_core::{GridPos, OrderId};

/// Why a vehicle gave up its job.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReleaseReason {
    Maintenance,
    Breakdown,
    /// No path to the job's next stop for too long.
    Stalled,
    /// The vehicle was removed from the fleet.
    Removed,
}

impl ReleaseReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ReleaseReason::Maintenance => "maintenance",
            ReleaseReason::Breakdown   => "breakdown",
            ReleaseReason::Stalled     => "stalled",
            ReleaseReason::Removed     => "removed",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum VehicleEvent {
    /// Cargo loaded at the order's origin.
    PickedUp { order: OrderId },
    Delivered { order: OrderId, at_ms: u64, revenue: f64, on_time: bool },
    /// The order goes back to pending.
    OrderReleased { order: OrderId, reason: ReleaseReason },
    LowFuel { fuel: f32 },
    LowMaintenance { level: f32 },
    BrokeDown,
    Refueled { amount: f32, cost: f64 },
    Serviced { cost: f64 },
    Repaired { cost: f64 },
    /// First tick without a path to `target`.
    PathUnavailable { target: GridPos },
}

impl VehicleEvent {
    /// Cost to book against the fleet's expense ledger, if any.
    pub fn cost(&self) -> Option<f64> {
        match *self {
            VehicleEvent::Refueled { cost, .. }
            | VehicleEvent::Serviced { cost }
            | VehicleEvent::Repaired { cost } => Some(cost),
            _ => None,
        }
    }
}
