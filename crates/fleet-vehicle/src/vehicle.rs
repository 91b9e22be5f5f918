//! Per-vehicle state.

use fleet_core::{ClassSpec, GridPos, OrderId, Point, VehicleClass, VehicleId};

use crate::{VehicleError, VehicleResult, VehicleStatus};

/// The order a vehicle is working on, copied at assignment time so the
/// engine never needs the order book.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Job {
    pub order:          OrderId,
    pub origin:         GridPos,
    pub destination:    GridPos,
    pub quantity:       u32,
    pub revenue:        f64,
    pub assigned_at_ms: u64,
    pub window_end_ms:  u64,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vehicle {
    pub id:       VehicleId,
    pub class:    VehicleClass,
    pub spec:     ClassSpec,

    // ── Movement ──────────────────────────────────────────────────────────
    pub position: Point,
    pub target:   Option<GridPos>,
    /// Waypoints toward `target`; `path[cursor]` is the next one.
    pub path:     Vec<GridPos>,
    pub cursor:   usize,
    pub status:   VehicleStatus,

    // ── Resources ─────────────────────────────────────────────────────────
    pub cargo:       u32,
    pub fuel:        f32,
    /// 0–100; 100 is a freshly serviced vehicle.
    pub maintenance: f32,
    pub job:         Option<Job>,

    // ── Counters ──────────────────────────────────────────────────────────
    pub deliveries:        u32,
    /// Cells travelled.
    pub distance:          f32,
    pub revenue:           f64,
    /// Sum of assignment-to-delivery times, simulated ms.
    pub total_delivery_ms: u64,
    /// Consecutive ticks without a path to `target`.
    pub stalled_ticks:     u32,
}

impl Vehicle {
    /// A fully fuelled, freshly serviced, idle vehicle parked at `home`.
    pub fn new(id: VehicleId, class: VehicleClass, spec: ClassSpec, home: GridPos) -> Self {
        let fuel = spec.tank_capacity;
        Self {
            id,
            class,
            spec,
            position: home.to_point(),
            target: None,
            path: Vec::new(),
            cursor: 0,
            status: VehicleStatus::Idle,
            cargo: 0,
            fuel,
            maintenance: 100.0,
            job: None,
            deliveries: 0,
            distance: 0.0,
            revenue: 0.0,
            total_delivery_ms: 0,
            stalled_ticks: 0,
        }
    }

    #[inline]
    pub fn cell(&self) -> GridPos {
        self.position.cell()
    }

    #[inline]
    pub fn fuel_fraction(&self) -> f32 {
        self.fuel / self.spec.tank_capacity
    }

    #[inline]
    pub fn load_fraction(&self) -> f32 {
        if self.spec.capacity == 0 { 0.0 } else { self.cargo as f32 / self.spec.capacity as f32 }
    }

    /// Idle and unassigned.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.status == VehicleStatus::Idle && self.job.is_none()
    }

    pub fn average_delivery_ms(&self) -> Option<f64> {
        (self.deliveries > 0).then(|| self.total_delivery_ms as f64 / self.deliveries as f64)
    }

    /// Waypoints not yet reached.
    pub fn remaining_path(&self) -> &[GridPos] {
        self.path.get(self.cursor..).unwrap_or(&[])
    }

    #[inline]
    pub fn path_exhausted(&self) -> bool {
        self.cursor >= self.path.len()
    }

    pub fn clear_course(&mut self) {
        self.target = None;
        self.path.clear();
        self.cursor = 0;
    }

    /// Verify the resource and state invariants.
    pub fn check_invariants(&self) -> VehicleResult<()> {
        if self.cargo > self.spec.capacity {
            return Err(VehicleError::OverCapacity {
                vehicle:  self.id,
                cargo:    self.cargo,
                capacity: self.spec.capacity,
            });
        }
        if !(0.0..=self.spec.tank_capacity).contains(&self.fuel) {
            return Err(VehicleError::FuelOutOfRange {
                vehicle: self.id,
                fuel:    self.fuel,
                tank:    self.spec.tank_capacity,
            });
        }
        if !(0.0..=100.0).contains(&self.maintenance) {
            return Err(VehicleError::MaintenanceOutOfRange { vehicle: self.id, level: self.maintenance });
        }
        if self.status.is_active() && self.target.is_none() {
            return Err(VehicleError::MissingTarget { vehicle: self.id, status: self.status });
        }
        if self.cargo > 0 && self.job.is_none() {
            return Err(VehicleError::CargoWithoutJob(self.id));
        }
        Ok(())
    }
}
