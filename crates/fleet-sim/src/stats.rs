//! Aggregate counters derived from the fleet and the order book.
//!
//! Nothing here is authoritative: [`SimulationStatistics::compute`] rebuilds
//! every field from the live collections plus the [`CostLedger`], which is
//! the only running total the simulation keeps (costs cannot be recovered
//! from vehicles that have since been removed).

use fleet_core::Tick;
use fleet_dispatch::{FailureReason, OrderBook, OrderStatus};
use fleet_vehicle::{Fleet, VehicleEvent, VehicleStatus};

/// Running expense totals, booked from [`VehicleEvent::cost`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostLedger {
    pub fuel:        f64,
    pub maintenance: f64,
    pub repairs:     f64,
}

impl CostLedger {
    pub fn record(&mut self, event: &VehicleEvent) {
        match *event {
            VehicleEvent::Refueled { cost, .. } => self.fuel += cost,
            VehicleEvent::Serviced { cost }     => self.maintenance += cost,
            VehicleEvent::Repaired { cost }     => self.repairs += cost,
            _ => {}
        }
    }

    pub fn total(&self) -> f64 {
        self.fuel + self.maintenance + self.repairs
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationStatistics {
    pub tick:  Tick,
    pub now_ms: u64,

    // ── Orders ────────────────────────────────────────────────────────────
    pub total_orders:      usize,
    pub pending_orders:    usize,
    pub active_orders:     usize,
    pub completed_orders:  usize,
    pub failed_orders:     usize,
    pub expired_orders:    usize,
    pub cancelled_orders:  usize,
    pub on_time_deliveries: usize,
    /// completed / (completed + failed); 0 before anything closes.
    pub completion_rate:   f64,

    // ── Fleet ─────────────────────────────────────────────────────────────
    pub fleet_size:        usize,
    pub idle_vehicles:     usize,
    /// Picking up, delivering, or returning.
    pub busy_vehicles:     usize,
    /// Refueling, in maintenance, or broken down.
    pub service_vehicles:  usize,
    /// busy / fleet size.
    pub utilization:       f64,
    pub total_deliveries:  u32,
    pub total_distance:    f64,
    /// Mean assignment-to-delivery time over every delivery, simulated ms.
    pub average_delivery_ms: f64,

    // ── Money ─────────────────────────────────────────────────────────────
    pub revenue:           f64,
    pub fuel_cost:         f64,
    pub maintenance_cost:  f64,
    pub total_costs:       f64,
    pub profit:            f64,
}

impl SimulationStatistics {
    pub fn compute(tick: Tick, now_ms: u64, fleet: &Fleet, orders: &OrderBook, ledger: &CostLedger) -> Self {
        let mut s = SimulationStatistics { tick, now_ms, ..Default::default() };

        let counts = orders.counts();
        s.total_orders = counts.total();
        s.pending_orders = counts.pending;
        s.active_orders = counts.active();
        s.completed_orders = counts.completed;
        s.failed_orders = counts.failed;

        for o in orders.iter() {
            match (o.status, o.failure) {
                (OrderStatus::Completed, _) => {
                    s.revenue += o.revenue;
                    if o.closed_at_ms.is_some_and(|t| t <= o.window_end_ms) {
                        s.on_time_deliveries += 1;
                    }
                }
                (OrderStatus::Failed, Some(FailureReason::Expired))   => s.expired_orders += 1,
                (OrderStatus::Failed, Some(FailureReason::Cancelled)) => s.cancelled_orders += 1,
                _ => {}
            }
        }
        let closed = s.completed_orders + s.failed_orders;
        if closed > 0 {
            s.completion_rate = s.completed_orders as f64 / closed as f64;
        }

        let mut delivery_ms = 0u64;
        for v in fleet.iter() {
            match v.status {
                VehicleStatus::Idle => s.idle_vehicles += 1,
                status if status.is_service() => s.service_vehicles += 1,
                _ => s.busy_vehicles += 1,
            }
            s.total_deliveries += v.deliveries;
            s.total_distance += v.distance as f64;
            delivery_ms += v.total_delivery_ms;
        }
        s.fleet_size = fleet.len();
        if s.fleet_size > 0 {
            s.utilization = s.busy_vehicles as f64 / s.fleet_size as f64;
        }
        if s.total_deliveries > 0 {
            s.average_delivery_ms = delivery_ms as f64 / s.total_deliveries as f64;
        }

        s.fuel_cost = ledger.fuel;
        s.maintenance_cost = ledger.maintenance + ledger.repairs;
        s.total_costs = ledger.total();
        s.profit = s.revenue - s.total_costs;
        s
    }
}
