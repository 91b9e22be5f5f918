//! Top-level simulation configuration.
//!
//! `FleetConfig::default()` is the reference scenario: a 70×50 grid, one
//! central plant and two fuel tanks, an eight-vehicle mixed fleet.  With the
//! `serde` feature every section deserializes with `#[serde(default)]`, so a
//! JSON file only needs the fields it overrides.

use crate::{ClassTable, FleetError, FleetResult, GridBounds, GridPos, VehicleClass};

// ── Depots ────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DepotKind {
    /// Home base: vehicles return, refuel, and are serviced here.
    Plant,
    /// Refuelling only.
    Tank,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Depot {
    pub name: String,
    pub pos:  GridPos,
    pub kind: DepotKind,
}

impl Depot {
    pub fn new(name: impl Into<String>, pos: GridPos, kind: DepotKind) -> Self {
        Self { name: name.into(), pos, kind }
    }
}

// ── Sections ──────────────────────────────────────────────────────────────────

/// Map size, traffic seeding, and the pathfinder's work bound.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridConfig {
    pub width:            u32,
    pub height:           u32,
    /// Upper bound of the uniform random traffic baseline per cell.
    pub traffic_baseline: f32,
    /// Extra traffic weight at a depot cell, fading linearly to 0 at `depot_radius`.
    pub depot_boost:      f32,
    pub depot_radius:     f32,
    /// Maximum A* node expansions per request.  `None` = one per cell.
    pub search_budget:    Option<usize>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width:            70,
            height:           50,
            traffic_baseline: 0.3,
            depot_boost:      1.5,
            depot_radius:     10.0,
            search_budget:    None,
        }
    }
}

impl GridConfig {
    pub fn bounds(&self) -> GridBounds {
        GridBounds::new(self.width, self.height)
    }
}

/// Tick resolution and the periods of the recurring phases.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClockConfig {
    /// Wall-clock milliseconds between ticks at speed 1.0.
    pub tick_period_ms:    u64,
    /// Simulated milliseconds per tick.
    pub ms_per_tick:       u64,
    /// Order generation runs every N ticks.
    pub generation_period: u64,
    /// The scheduler runs every M ticks.
    pub dispatch_period:   u64,
    /// Statistics are recomputed every P ticks.
    pub stats_period:      u64,
    /// Alerts, blockages, and overdue orders are swept every Q ticks.
    pub sweep_period:      u64,
    /// Stop a headless `run()` after this many ticks.  `None` = until stopped.
    pub total_ticks:       Option<u64>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_period_ms:    100,
            ms_per_tick:       1000,
            generation_period: 30,
            dispatch_period:   10,
            stats_period:      10,
            sweep_period:      20,
            total_ticks:       None,
        }
    }
}

/// Thresholds and rates driving the per-vehicle state machine.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VehicleConfig {
    /// Cells per tick before the class multiplier.
    pub base_speed:               f32,
    /// Distance (cells) at which a target counts as reached.
    pub arrival_tolerance:        f32,
    /// Below this fraction of the tank a vehicle diverts to refuel.
    pub low_fuel_fraction:        f32,
    /// Below this maintenance level a vehicle diverts to service.
    pub low_maintenance:          f32,
    /// The scheduler only considers vehicles above this maintenance level.
    pub dispatch_min_maintenance: f32,
    /// The scheduler only considers vehicles holding more fuel than this, in
    /// absolute units whatever the tank size.
    pub dispatch_min_fuel:        f32,
    /// Fuel burned per tick while idle.
    pub idle_fuel_burn:           f32,
    /// Extra burn at full load: burn × (1 + load_fuel_factor × load_fraction).
    pub load_fuel_factor:         f32,
    /// Maintenance lost per tick while idle.
    pub idle_wear:                f32,
    /// Maintenance lost per tick while active.
    pub active_wear:              f32,
    /// Per-tick breakdown probability for any vehicle not already in service.
    pub breakdown_probability:    f64,
    /// Cost per unit of fuel refilled.
    pub fuel_price:               f64,
    /// Consecutive ticks without a path before a job is released.
    pub max_stalled_ticks:        u32,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            base_speed:               0.5,
            arrival_tolerance:        1.2,
            low_fuel_fraction:        0.2,
            low_maintenance:          20.0,
            dispatch_min_maintenance: 30.0,
            dispatch_min_fuel:        20.0,
            idle_fuel_burn:           0.005,
            load_fuel_factor:         0.5,
            idle_wear:                0.002,
            active_wear:              0.02,
            breakdown_probability:    0.0005,
            fuel_price:               1.5,
            max_stalled_ticks:        200,
        }
    }
}

/// Revenue multipliers per priority level.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PriorityMultipliers {
    pub low:    f64,
    pub medium: f64,
    pub high:   f64,
    pub urgent: f64,
}

impl Default for PriorityMultipliers {
    fn default() -> Self {
        Self { low: 1.0, medium: 1.2, high: 1.5, urgent: 2.0 }
    }
}

/// Synthetic order generation and revenue.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OrderConfig {
    /// Probability that a generation tick actually creates an order.
    pub generation_probability: f64,
    pub min_quantity:           u32,
    pub max_quantity:           u32,
    /// Delivery window length range, simulated ms from creation.
    pub min_window_ms:          u64,
    pub max_window_ms:          u64,
    pub revenue_per_unit:       f64,
    pub revenue_per_cell:       f64,
    pub priority_multipliers:   PriorityMultipliers,
    /// Terminal orders kept in each snapshot (most recent first).
    pub recent_terminal_limit:  usize,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            generation_probability: 0.7,
            min_quantity:           1,
            max_quantity:           30,
            min_window_ms:          300_000,
            max_window_ms:          900_000,
            revenue_per_unit:       10.0,
            revenue_per_cell:       2.0,
            priority_multipliers:   PriorityMultipliers::default(),
            recent_terminal_limit:  50,
        }
    }
}

/// Permanent construction and temporary incident blockages.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BlockageConfig {
    pub permanent_count:       u32,
    pub permanent_min_len:     u32,
    pub permanent_max_len:     u32,
    /// An incident is attempted every this many ticks (0 disables).
    pub incident_period_ticks: u64,
    pub incident_probability:  f64,
    pub incident_min_ms:       u64,
    pub incident_max_ms:       u64,
    pub incident_min_len:      u32,
    pub incident_max_len:      u32,
    /// Congestion multiplier applied to cells adjacent to a blockage.
    pub traffic_weight:        f32,
}

impl Default for BlockageConfig {
    fn default() -> Self {
        Self {
            permanent_count:       3,
            permanent_min_len:     4,
            permanent_max_len:     10,
            incident_period_ticks: 200,
            incident_probability:  0.5,
            incident_min_ms:       120_000,
            incident_max_ms:       300_000,
            incident_min_len:      2,
            incident_max_len:      5,
            traffic_weight:        1.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AlertConfig {
    /// Ring capacity; the oldest alert is evicted first.
    pub capacity:   usize,
    /// Alerts older than this are dropped on sweep.
    pub max_age_ms: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self { capacity: 50, max_age_ms: 120_000 }
    }
}

/// One line of the starting fleet composition.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FleetEntry {
    pub class: VehicleClass,
    pub count: u32,
}

// ── FleetConfig ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FleetConfig {
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed:      u64,
    pub grid:      GridConfig,
    pub clock:     ClockConfig,
    pub depots:    Vec<Depot>,
    pub classes:   ClassTable,
    pub fleet:     Vec<FleetEntry>,
    pub vehicle:   VehicleConfig,
    pub orders:    OrderConfig,
    pub blockages: BlockageConfig,
    pub alerts:    AlertConfig,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            seed:      42,
            grid:      GridConfig::default(),
            clock:     ClockConfig::default(),
            depots:    vec![
                Depot::new("Central Plant", GridPos::new(12, 8), DepotKind::Plant),
                Depot::new("North Tank", GridPos::new(42, 42), DepotKind::Tank),
                Depot::new("East Tank", GridPos::new(63, 3), DepotKind::Tank),
            ],
            classes:   ClassTable::default(),
            fleet:     vec![
                FleetEntry { class: VehicleClass::Mini, count: 2 },
                FleetEntry { class: VehicleClass::Standard, count: 3 },
                FleetEntry { class: VehicleClass::Large, count: 2 },
                FleetEntry { class: VehicleClass::Mega, count: 1 },
            ],
            vehicle:   VehicleConfig::default(),
            orders:    OrderConfig::default(),
            blockages: BlockageConfig::default(),
            alerts:    AlertConfig::default(),
        }
    }
}

impl FleetConfig {
    /// The first `Plant` depot: where vehicles start, return, and are serviced.
    pub fn central_depot(&self) -> Option<&Depot> {
        self.depots.iter().find(|d| d.kind == DepotKind::Plant)
    }

    /// Reject configurations the engine cannot run.
    pub fn validate(&self) -> FleetResult<()> {
        let bounds = self.grid.bounds();
        if bounds.cell_count() == 0 {
            return Err(FleetError::Config("grid must be at least 1×1".into()));
        }
        if self.central_depot().is_none() {
            return Err(FleetError::Config("at least one plant depot is required".into()));
        }
        if let Some(d) = self.depots.iter().find(|d| !bounds.contains(d.pos)) {
            return Err(FleetError::Config(format!("depot {:?} at {} is off the grid", d.name, d.pos)));
        }

        let c = &self.clock;
        if c.ms_per_tick == 0 {
            return Err(FleetError::Config("clock.ms_per_tick must be > 0".into()));
        }
        for (name, period) in [
            ("generation_period", c.generation_period),
            ("dispatch_period", c.dispatch_period),
            ("stats_period", c.stats_period),
            ("sweep_period", c.sweep_period),
        ] {
            if period == 0 {
                return Err(FleetError::Config(format!("clock.{name} must be > 0")));
            }
        }

        if self.vehicle.base_speed <= 0.0 {
            return Err(FleetError::Config("vehicle.base_speed must be > 0".into()));
        }
        for (name, p) in [
            ("vehicle.breakdown_probability", self.vehicle.breakdown_probability),
            ("orders.generation_probability", self.orders.generation_probability),
            ("blockages.incident_probability", self.blockages.incident_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(FleetError::Config(format!("{name} must be in [0, 1], got {p}")));
            }
        }

        let o = &self.orders;
        if o.min_quantity == 0 || o.min_quantity > o.max_quantity {
            return Err(FleetError::Config(format!(
                "order quantity range {}..={} is invalid",
                o.min_quantity, o.max_quantity
            )));
        }
        let largest = VehicleClass::ALL
            .iter()
            .map(|&cls| self.classes.get(cls).capacity)
            .max()
            .unwrap_or(0);
        if o.max_quantity > largest {
            return Err(FleetError::Config(format!(
                "orders.max_quantity {} exceeds the largest class capacity {largest}",
                o.max_quantity
            )));
        }
        if o.min_window_ms > o.max_window_ms {
            return Err(FleetError::Config("order window range is inverted".into()));
        }

        let b = &self.blockages;
        if b.permanent_min_len > b.permanent_max_len
            || b.incident_min_len > b.incident_max_len
            || b.incident_min_ms > b.incident_max_ms
        {
            return Err(FleetError::Config("blockage ranges are inverted".into()));
        }

        if self.alerts.capacity == 0 {
            return Err(FleetError::Config("alerts.capacity must be > 0".into()));
        }
        Ok(())
    }
}
