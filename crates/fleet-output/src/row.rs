//! Plain data row types written by output backends.

use fleet_core::OrderId;
use fleet_sim::SimulationStatistics;
use fleet_vehicle::Vehicle;

/// One vehicle's state at a statistics refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleSnapshotRow {
    pub tick:        u64,
    pub vehicle_id:  u32,
    pub class:       &'static str,
    pub status:      &'static str,
    pub x:           f32,
    pub y:           f32,
    pub fuel:        f32,
    pub maintenance: f32,
    pub cargo:       u32,
    /// Order being served; `u32::MAX` when the vehicle has no job.
    pub order_id:    u32,
    pub deliveries:  u32,
    pub distance:    f32,
}

impl VehicleSnapshotRow {
    pub fn from_vehicle(tick: u64, v: &Vehicle) -> Self {
        Self {
            tick,
            vehicle_id:  v.id.0,
            class:       v.class.as_str(),
            status:      v.status.as_str(),
            x:           v.position.x,
            y:           v.position.y,
            fuel:        v.fuel,
            maintenance: v.maintenance,
            cargo:       v.cargo,
            order_id:    v.job.as_ref().map_or(OrderId::INVALID, |j| j.order).0,
            deliveries:  v.deliveries,
            distance:    v.distance,
        }
    }
}

/// Headline statistics at one refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsRow {
    pub tick:             u64,
    pub now_ms:           u64,
    pub pending_orders:   u64,
    pub active_orders:    u64,
    pub completed_orders: u64,
    pub failed_orders:    u64,
    pub fleet_size:       u64,
    pub busy_vehicles:    u64,
    pub utilization:      f64,
    pub completion_rate:  f64,
    pub revenue:          f64,
    pub total_costs:      f64,
    pub profit:           f64,
}

impl From<&SimulationStatistics> for StatsRow {
    fn from(s: &SimulationStatistics) -> Self {
        Self {
            tick:             s.tick.0,
            now_ms:           s.now_ms,
            pending_orders:   s.pending_orders as u64,
            active_orders:    s.active_orders as u64,
            completed_orders: s.completed_orders as u64,
            failed_orders:    s.failed_orders as u64,
            fleet_size:       s.fleet_size as u64,
            busy_vehicles:    s.busy_vehicles as u64,
            utilization:      s.utilization,
            completion_rate:  s.completion_rate,
            revenue:          s.revenue,
            total_costs:      s.total_costs,
            profit:           s.profit,
        }
    }
}
