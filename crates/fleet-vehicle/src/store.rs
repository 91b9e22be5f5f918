//! The fleet: vehicles plus one deterministic RNG stream each.

use fleet_core::{ClassSpec, GridPos, VehicleClass, VehicleId, VehicleRng};

use crate::Vehicle;

/// Vehicles in insertion order alongside their RNG streams.
///
/// `vehicles[i]` and `rngs[i]` always belong together.  Lookups by id are a
/// linear scan; a fleet is tens of vehicles, not millions.
pub struct Fleet {
    vehicles: Vec<Vehicle>,
    rngs:     Vec<VehicleRng>,
    seed:     u64,
    next_id:  VehicleId,
}

impl Fleet {
    pub fn new(seed: u64) -> Self {
        Self { vehicles: Vec::new(), rngs: Vec::new(), seed, next_id: VehicleId(1) }
    }

    /// Park a new vehicle at `home` and return its id.
    pub fn add(&mut self, class: VehicleClass, spec: ClassSpec, home: GridPos) -> VehicleId {
        let id = self.next_id;
        self.next_id = id.next();
        self.vehicles.push(Vehicle::new(id, class, spec, home));
        self.rngs.push(VehicleRng::new(self.seed, id));
        id
    }

    pub fn remove(&mut self, id: VehicleId) -> Option<Vehicle> {
        let i = self.position(id)?;
        self.rngs.remove(i);
        Some(self.vehicles.remove(i))
    }

    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn get_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.iter_mut().find(|v| v.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Vehicle> {
        self.vehicles.iter_mut()
    }

    /// Each vehicle paired with its own RNG stream.
    pub fn iter_with_rng(&mut self) -> impl Iterator<Item = (&mut Vehicle, &mut VehicleRng)> {
        self.vehicles.iter_mut().zip(self.rngs.iter_mut())
    }

    pub fn as_slice(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Drop every vehicle and restart id allocation.
    pub fn clear(&mut self) {
        self.vehicles.clear();
        self.rngs.clear();
        self.next_id = VehicleId(1);
    }

    fn position(&self, id: VehicleId) -> Option<usize> {
        self.vehicles.iter().position(|v| v.id == id)
    }
}
