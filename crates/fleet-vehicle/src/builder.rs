//! Fluent builder for the starting fleet.
//!
//! # Usage
//!
//! ```rust
//! use fleet_core::{ClassTable, FleetEntry, GridPos, VehicleClass};
//! use fleet_vehicle::FleetBuilder;
//!
//! let fleet = FleetBuilder::new(/*seed=*/ 42, GridPos::new(12, 8))
//!     .classes(ClassTable::default())
//!     .with(VehicleClass::Standard, 3)
//!     .with(VehicleClass::Mega, 1)
//!     .build();
//!
//! assert_eq!(fleet.len(), 4);
//! ```

use fleet_core::{ClassTable, FleetEntry, GridPos, VehicleClass};

use crate::Fleet;

pub struct FleetBuilder {
    seed:    u64,
    home:    GridPos,
    classes: ClassTable,
    entries: Vec<FleetEntry>,
}

impl FleetBuilder {
    /// Vehicles will start parked at `home`.
    pub fn new(seed: u64, home: GridPos) -> Self {
        Self { seed, home, classes: ClassTable::default(), entries: Vec::new() }
    }

    pub fn classes(mut self, classes: ClassTable) -> Self {
        self.classes = classes;
        self
    }

    /// Append `count` vehicles of `class`.
    pub fn with(mut self, class: VehicleClass, count: u32) -> Self {
        self.entries.push(FleetEntry { class, count });
        self
    }

    pub fn composition(mut self, entries: &[FleetEntry]) -> Self {
        self.entries.extend_from_slice(entries);
        self
    }

    /// Ids are assigned in composition order, starting at 1.
    pub fn build(self) -> Fleet {
        let mut fleet = Fleet::new(self.seed);
        for entry in &self.entries {
            for _ in 0..entry.count {
                fleet.add(entry.class, self.classes.get(entry.class).clone(), self.home);
            }
        }
        fleet
    }
}
