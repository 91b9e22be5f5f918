//! Read-only view of the simulation for renderers and hit-testing.

use fleet_core::{Depot, DepotKind, GridPos, Tick};
use fleet_dispatch::Order;
use fleet_grid::Blockage;
use fleet_vehicle::{Vehicle, VehicleStatus};

use crate::{Alert, RunState, SimulationStatistics};

/// Everything a front end needs for one frame.  Cheap to share behind an
/// `Arc`; never mutated after construction.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Snapshot {
    pub tick:      Tick,
    pub now_ms:    u64,
    pub state:     RunState,
    pub speed:     f32,
    pub vehicles:  Vec<Vehicle>,
    /// Every active order followed by the most recently closed ones.
    pub orders:    Vec<Order>,
    pub blockages: Vec<Blockage>,
    pub depots:    Vec<Depot>,
    /// Newest first, age-filtered.
    pub alerts:    Vec<Alert>,
    pub stats:     SimulationStatistics,
    /// Tag of the loaded external feed, if any.
    pub external:  Option<String>,
}

/// One selectable thing on the map.
#[derive(Copy, Clone, Debug)]
pub enum Entity<'a> {
    Vehicle(&'a Vehicle),
    /// A pickup point.
    Order(&'a Order),
    Blockage(&'a Blockage),
    /// A vehicle stranded by a breakdown.
    Breakdown(&'a Vehicle),
    /// A vehicle on its way to or in service.
    Maintenance(&'a Vehicle),
    Plant(&'a Depot),
    Tank(&'a Depot),
    /// An order's drop-off point.
    Client(&'a Order),
}

impl Entity<'_> {
    /// Whether this entity occupies `cell`.
    pub fn covers(&self, cell: GridPos) -> bool {
        match self {
            Entity::Vehicle(v) | Entity::Breakdown(v) | Entity::Maintenance(v) => v.cell() == cell,
            Entity::Order(o)    => o.origin == cell,
            Entity::Client(o)   => o.destination == cell,
            Entity::Blockage(b) => b.contains(cell),
            Entity::Plant(d) | Entity::Tank(d) => d.pos == cell,
        }
    }

    /// Short tooltip text.
    pub fn label(&self) -> String {
        match self {
            Entity::Vehicle(v) => format!("{} #{} ({})", v.class, v.id.0, v.status),
            Entity::Breakdown(v) => format!("{} #{} broken down", v.class, v.id.0),
            Entity::Maintenance(v) => format!("{} #{} in maintenance", v.class, v.id.0),
            Entity::Order(o) => match &o.origin_name {
                Some(name) => format!("Order #{} pickup at {name}", o.id.0),
                None => format!("Order #{} pickup at {}", o.id.0, o.origin),
            },
            Entity::Client(o) => match &o.destination_name {
                Some(name) => format!("Order #{} drop-off at {name}", o.id.0),
                None => format!("Order #{} drop-off at {}", o.id.0, o.destination),
            },
            Entity::Blockage(b) => format!("{} blockage: {}", b.severity, b.reason),
            Entity::Plant(d) => format!("{} (plant)", d.name),
            Entity::Tank(d) => format!("{} (tank)", d.name),
        }
    }
}

impl Snapshot {
    /// Every entity in draw order: depots, blockages, orders, vehicles.
    pub fn entities(&self) -> impl Iterator<Item = Entity<'_>> {
        let depots = self.depots.iter().map(|d| match d.kind {
            DepotKind::Plant => Entity::Plant(d),
            DepotKind::Tank  => Entity::Tank(d),
        });
        let blockages = self.blockages.iter().map(Entity::Blockage);
        let orders = self
            .orders
            .iter()
            .filter(|o| !o.status.is_terminal())
            .flat_map(|o| [Entity::Order(o), Entity::Client(o)]);
        let vehicles = self.vehicles.iter().map(|v| match v.status {
            VehicleStatus::Breakdown   => Entity::Breakdown(v),
            VehicleStatus::Maintenance => Entity::Maintenance(v),
            _                          => Entity::Vehicle(v),
        });
        depots.chain(blockages).chain(orders).chain(vehicles)
    }

    /// Entities under `cell`, topmost (last drawn) first.
    pub fn entities_at(&self, cell: GridPos) -> Vec<Entity<'_>> {
        let mut hits: Vec<Entity<'_>> = self.entities().filter(|e| e.covers(cell)).collect();
        hits.reverse();
        hits
    }

    pub fn vehicle(&self, id: fleet_core::VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }
}
