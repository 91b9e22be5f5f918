//! Depot lookup.
//!
//! An R-tree (via `rstar`) maps a continuous position to the nearest depot.
//! Every depot refuels; only the central plant services and repairs.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use fleet_core::{Depot, DepotKind, GridPos, Point};

use crate::{GridError, GridResult};

#[derive(Clone)]
struct DepotEntry {
    point: [f32; 2], // [x, y]
    slot:  usize,
}

impl RTreeObject for DepotEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for DepotEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

pub struct DepotIndex {
    depots:  Vec<Depot>,
    central: usize,
    tree:    RTree<DepotEntry>,
}

impl DepotIndex {
    /// Index `depots`.  The first `Plant` becomes the central depot.
    pub fn new(depots: Vec<Depot>) -> GridResult<Self> {
        let central = depots
            .iter()
            .position(|d| d.kind == DepotKind::Plant)
            .ok_or(GridError::NoCentralDepot)?;
        let entries = depots
            .iter()
            .enumerate()
            .map(|(slot, d)| DepotEntry { point: [d.pos.x as f32, d.pos.y as f32], slot })
            .collect();
        Ok(Self { depots, central, tree: RTree::bulk_load(entries) })
    }

    pub fn central(&self) -> &Depot {
        &self.depots[self.central]
    }

    /// Nearest depot of any kind by straight-line distance.
    pub fn nearest(&self, p: Point) -> &Depot {
        self.tree
            .nearest_neighbor(&[p.x, p.y])
            .map_or(self.central(), |e| &self.depots[e.slot])
    }

    pub fn at(&self, p: GridPos) -> Option<&Depot> {
        self.depots.iter().find(|d| d.pos == p)
    }

    #[inline]
    pub fn is_depot(&self, p: GridPos) -> bool {
        self.at(p).is_some()
    }

    pub fn all(&self) -> &[Depot] {
        &self.depots
    }

    pub fn positions(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.depots.iter().map(|d| d.pos)
    }
}
