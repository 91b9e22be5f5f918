//! Read-only state handed to an [`AssignmentPolicy`][crate::AssignmentPolicy].

use fleet_core::VehicleConfig;
use fleet_vehicle::Vehicle;

use crate::OrderBook;

/// Built once per dispatch pass; all borrows live for that pass only.
pub struct DispatchContext<'a> {
    pub now_ms:   u64,
    pub orders:   &'a OrderBook,
    pub vehicles: &'a [Vehicle],
    /// Eligibility thresholds (`dispatch_min_fuel`, `dispatch_min_maintenance`).
    pub params:   &'a VehicleConfig,
}

impl<'a> DispatchContext<'a> {
    #[inline]
    pub fn new(
        now_ms:   u64,
        orders:   &'a OrderBook,
        vehicles: &'a [Vehicle],
        params:   &'a VehicleConfig,
    ) -> Self {
        Self { now_ms, orders, vehicles, params }
    }
}
