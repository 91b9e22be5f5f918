//! The per-tick vehicle state machine.
//!
//! # Tick order
//!
//! | Step | Phase      | Effect                                                    |
//! |------|------------|-----------------------------------------------------------|
//! | 1    | decay      | burn fuel (scaled by load), wear maintenance; clamp at 0  |
//! | 2    | preemption | low fuel → refuel, low maintenance → service, breakdown   |
//! | 3    | movement   | fetch a path if exhausted, else step toward a waypoint    |
//! | 4    | arrival    | within tolerance of the target: snap and change state     |
//!
//! Refuelling keeps the job and resumes it afterwards.  Service and
//! breakdown release it, which the caller sees as
//! [`VehicleEvent::OrderReleased`].

use fleet_core::{GridPos, RandomSource, VehicleConfig};
use fleet_grid::{DepotIndex, GridMap, Router, find_path};

use crate::{
    Job, ReleaseReason, Vehicle, VehicleError, VehicleEvent, VehicleResult, VehicleStatus,
};

/// Distance below which a vehicle snaps onto its current waypoint.
const WAYPOINT_EPS: f32 = 1e-3;

/// What a vehicle can see of the world during its update.
#[derive(Clone, Copy)]
pub struct Surroundings<'a> {
    pub map:    GridMap<'a>,
    pub depots: &'a DepotIndex,
    pub now_ms: u64,
}

pub struct VehicleEngine<R: Router> {
    pub router: R,
    pub params: VehicleConfig,
}

impl<R: Router> VehicleEngine<R> {
    pub fn new(router: R, params: VehicleConfig) -> Self {
        Self { router, params }
    }

    /// Advance `v` by one tick.
    pub fn update(
        &self,
        v: &mut Vehicle,
        world: &Surroundings<'_>,
        rng: &mut impl RandomSource,
    ) -> Vec<VehicleEvent> {
        let mut events = Vec::new();

        self.decay(v);
        self.preempt(v, world, rng, &mut events);

        if !v.status.is_active() {
            return events;
        }
        let target = match v.target {
            Some(t) => t,
            None => {
                // An active vehicle always has somewhere to go.
                self.route_to(v, world, world.depots.central().pos);
                world.depots.central().pos
            }
        };

        if !self.within_tolerance(v, target) {
            self.advance(v, world, target, &mut events);
        }
        if v.target == Some(target) && self.within_tolerance(v, target) {
            self.arrive(v, world, target, &mut events);
        }
        events
    }

    /// Attach `job` to an available vehicle and send it to the origin.
    pub fn begin_job(&self, v: &mut Vehicle, job: Job, world: &Surroundings<'_>) -> VehicleResult<()> {
        if !v.is_available() {
            return Err(VehicleError::Busy(v.id));
        }
        if job.quantity > v.spec.capacity {
            return Err(VehicleError::OverCapacity {
                vehicle:  v.id,
                cargo:    job.quantity,
                capacity: v.spec.capacity,
            });
        }
        let origin = job.origin;
        tracing::debug!(
            target: "fleet_vehicle::engine",
            vehicle = v.id.0,
            order = job.order.0,
            %origin,
            "job started"
        );
        v.job = Some(job);
        v.status = VehicleStatus::PickingUp;
        self.route_to(v, world, origin);
        Ok(())
    }

    /// Break the vehicle down on the spot, whatever it was doing.
    pub fn force_breakdown(&self, v: &mut Vehicle, world: &Surroundings<'_>) -> Vec<VehicleEvent> {
        let mut events = Vec::new();
        if v.status != VehicleStatus::Breakdown {
            self.break_down(v, world, &mut events);
        }
        events
    }

    /// Strip the job from a vehicle that is leaving the fleet.
    pub fn release_for_removal(&self, v: &mut Vehicle) -> Vec<VehicleEvent> {
        let mut events = Vec::new();
        release(v, ReleaseReason::Removed, &mut events);
        events
    }

    // ── Phases ────────────────────────────────────────────────────────────

    fn decay(&self, v: &mut Vehicle) {
        let p = &self.params;
        let active = v.status.is_active();
        let burn = if active { v.spec.fuel_per_cell * v.spec.speed(p.base_speed) } else { p.idle_fuel_burn };
        v.fuel = (v.fuel - burn * (1.0 + p.load_fuel_factor * v.load_fraction())).max(0.0);
        let wear = if active { p.active_wear } else { p.idle_wear };
        v.maintenance = (v.maintenance - wear).max(0.0);
    }

    fn preempt(
        &self,
        v: &mut Vehicle,
        world: &Surroundings<'_>,
        rng: &mut impl RandomSource,
        events: &mut Vec<VehicleEvent>,
    ) {
        if v.status.is_service() {
            return;
        }
        let p = &self.params;
        if v.fuel < p.low_fuel_fraction * v.spec.tank_capacity {
            let depot = world.depots.nearest(v.position).pos;
            tracing::debug!(target: "fleet_vehicle::engine", vehicle = v.id.0, fuel = v.fuel, %depot, "low fuel");
            events.push(VehicleEvent::LowFuel { fuel: v.fuel });
            v.status = VehicleStatus::Refueling;
            self.route_to(v, world, depot);
        } else if v.maintenance < p.low_maintenance {
            tracing::debug!(target: "fleet_vehicle::engine", vehicle = v.id.0, level = v.maintenance, "service due");
            events.push(VehicleEvent::LowMaintenance { level: v.maintenance });
            release(v, ReleaseReason::Maintenance, events);
            v.status = VehicleStatus::Maintenance;
            self.route_to(v, world, world.depots.central().pos);
        } else if rng.chance(p.breakdown_probability) {
            self.break_down(v, world, events);
        }
    }

    fn advance(
        &self,
        v: &mut Vehicle,
        world: &Surroundings<'_>,
        target: GridPos,
        events: &mut Vec<VehicleEvent>,
    ) {
        // A blockage may have appeared on the stored path since it was planned.
        if v.remaining_path().first().is_some_and(|&wp| !world.map.is_passable(wp)) {
            v.path.clear();
            v.cursor = 0;
        }

        if v.path_exhausted() {
            let path = find_path(&self.router, &world.map, v.cell(), target);
            if path.is_empty() {
                self.stall(v, world, target, events);
            } else {
                v.path = path;
                v.cursor = 0;
                v.stalled_ticks = 0;
            }
            return;
        }

        let wp = v.path[v.cursor].to_point();
        let dx = wp.x - v.position.x;
        let dy = wp.y - v.position.y;
        let speed = v.spec.speed(self.params.base_speed);

        let moved = if dx.abs() >= dy.abs() {
            let step = dx.abs().min(speed);
            v.position.x += step * dx.signum();
            step
        } else {
            let step = dy.abs().min(speed);
            v.position.y += step * dy.signum();
            step
        };
        v.distance += moved;

        if v.position.distance(wp) < WAYPOINT_EPS {
            v.position = wp;
            v.cursor += 1;
        }
    }

    fn stall(
        &self,
        v: &mut Vehicle,
        world: &Surroundings<'_>,
        target: GridPos,
        events: &mut Vec<VehicleEvent>,
    ) {
        v.stalled_ticks += 1;
        if v.stalled_ticks == 1 {
            events.push(VehicleEvent::PathUnavailable { target });
        }
        if v.stalled_ticks >= self.params.max_stalled_ticks && v.job.is_some() {
            tracing::debug!(target: "fleet_vehicle::engine", vehicle = v.id.0, %target, "stalled; releasing job");
            release(v, ReleaseReason::Stalled, events);
            v.stalled_ticks = 0;
            if !v.status.is_service() {
                v.status = VehicleStatus::Returning;
            }
            self.route_to(v, world, world.depots.central().pos);
        }
    }

    fn arrive(
        &self,
        v: &mut Vehicle,
        world: &Surroundings<'_>,
        target: GridPos,
        events: &mut Vec<VehicleEvent>,
    ) {
        v.position = target.to_point();
        v.path.clear();
        v.cursor = 0;
        v.stalled_ticks = 0;
        let central = world.depots.central().pos;

        match v.status {
            VehicleStatus::PickingUp => match v.job.as_ref().map(|j| (j.order, j.quantity, j.destination)) {
                Some((order, quantity, destination)) => {
                    v.cargo = quantity.min(v.spec.capacity);
                    events.push(VehicleEvent::PickedUp { order });
                    v.status = VehicleStatus::Delivering;
                    self.route_to(v, world, destination);
                }
                None => self.head_home(v, world),
            },
            VehicleStatus::Delivering => {
                if let Some(job) = v.job.take() {
                    let now = world.now_ms;
                    v.cargo = 0;
                    v.deliveries += 1;
                    v.revenue += job.revenue;
                    v.total_delivery_ms += now.saturating_sub(job.assigned_at_ms);
                    events.push(VehicleEvent::Delivered {
                        order:   job.order,
                        at_ms:   now,
                        revenue: job.revenue,
                        on_time: now <= job.window_end_ms,
                    });
                }
                self.head_home(v, world);
            }
            VehicleStatus::Refueling => {
                let amount = v.spec.tank_capacity - v.fuel;
                v.fuel = v.spec.tank_capacity;
                events.push(VehicleEvent::Refueled { amount, cost: amount as f64 * self.params.fuel_price });
                match v.job.as_ref().map(|j| (j.origin, j.destination)) {
                    Some((_, destination)) if v.cargo > 0 => {
                        v.status = VehicleStatus::Delivering;
                        self.route_to(v, world, destination);
                    }
                    Some((origin, _)) => {
                        v.status = VehicleStatus::PickingUp;
                        self.route_to(v, world, origin);
                    }
                    None => self.head_home(v, world),
                }
            }
            VehicleStatus::Returning | VehicleStatus::Maintenance | VehicleStatus::Breakdown => {
                match v.status {
                    VehicleStatus::Maintenance => {
                        v.maintenance = 100.0;
                        events.push(VehicleEvent::Serviced { cost: v.spec.maintenance_cost });
                    }
                    VehicleStatus::Breakdown => {
                        v.fuel = v.spec.tank_capacity;
                        v.maintenance = 100.0;
                        events.push(VehicleEvent::Repaired { cost: 2.0 * v.spec.maintenance_cost });
                    }
                    _ => {}
                }
                v.position = central.to_point();
                v.clear_course();
                v.job = None;
                v.cargo = 0;
                v.status = VehicleStatus::Idle;
            }
            VehicleStatus::Idle => {}
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn break_down(&self, v: &mut Vehicle, world: &Surroundings<'_>, events: &mut Vec<VehicleEvent>) {
        tracing::warn!(target: "fleet_vehicle::engine", vehicle = v.id.0, at = %v.position, "breakdown");
        events.push(VehicleEvent::BrokeDown);
        release(v, ReleaseReason::Breakdown, events);
        v.status = VehicleStatus::Breakdown;
        self.route_to(v, world, world.depots.central().pos);
    }

    fn head_home(&self, v: &mut Vehicle, world: &Surroundings<'_>) {
        v.status = VehicleStatus::Returning;
        self.route_to(v, world, world.depots.central().pos);
    }

    /// Point `v` at `target` and plan a path from its current cell.  An empty
    /// plan is retried by the movement phase.
    fn route_to(&self, v: &mut Vehicle, world: &Surroundings<'_>, target: GridPos) {
        v.target = Some(target);
        v.path = find_path(&self.router, &world.map, v.cell(), target);
        v.cursor = 0;
    }

    #[inline]
    fn within_tolerance(&self, v: &Vehicle, target: GridPos) -> bool {
        v.position.distance(target.to_point()) <= self.params.arrival_tolerance
    }
}

fn release(v: &mut Vehicle, reason: ReleaseReason, events: &mut Vec<VehicleEvent>) {
    if let Some(job) = v.job.take() {
        v.cargo = 0;
        events.push(VehicleEvent::OrderReleased { order: job.order, reason });
    }
}
