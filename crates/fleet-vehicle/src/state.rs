//! Vehicle lifecycle states.

use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VehicleStatus {
    /// Parked at the central depot, available for dispatch.
    #[default]
    Idle,
    /// Driving to an order's origin.
    PickingUp,
    /// Loaded, driving to an order's destination.
    Delivering,
    /// Driving back to the central depot.
    Returning,
    /// Driving to the nearest depot to refill.
    Refueling,
    /// Driving to the central depot for service.
    Maintenance,
    /// Being recovered to the central depot for repair.
    Breakdown,
}

impl VehicleStatus {
    pub const ALL: [VehicleStatus; 7] = [
        VehicleStatus::Idle,
        VehicleStatus::PickingUp,
        VehicleStatus::Delivering,
        VehicleStatus::Returning,
        VehicleStatus::Refueling,
        VehicleStatus::Maintenance,
        VehicleStatus::Breakdown,
    ];

    /// Any state other than `Idle`: the vehicle is moving toward a target.
    #[inline]
    pub fn is_active(self) -> bool {
        self != VehicleStatus::Idle
    }

    /// Resource states that are never preempted.
    #[inline]
    pub fn is_service(self) -> bool {
        matches!(
            self,
            VehicleStatus::Refueling | VehicleStatus::Maintenance | VehicleStatus::Breakdown
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VehicleStatus::Idle        => "idle",
            VehicleStatus::PickingUp   => "picking_up",
            VehicleStatus::Delivering  => "delivering",
            VehicleStatus::Returning   => "returning",
            VehicleStatus::Refueling   => "refueling",
            VehicleStatus::Maintenance => "maintenance",
            VehicleStatus::Breakdown   => "breakdown",
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
