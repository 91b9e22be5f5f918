//! Unit tests for fleet-grid.
//!
//! All tests build small hand-made maps so routes can be asserted exactly.

#[cfg(test)]
mod helpers {
    use fleet_core::{GridBounds, GridPos};

    use crate::{Blockage, BlockageRegistry, TrafficField};

    pub fn flat(width: u32, height: u32) -> (TrafficField, BlockageRegistry) {
        let bounds = GridBounds::new(width, height);
        (TrafficField::uniform(bounds, 0.0), BlockageRegistry::new(bounds))
    }

    pub fn wall(x: i32, y0: i32, y1: i32) -> Blockage {
        Blockage::segment(GridPos::new(x, y0), GridPos::new(x, y1)).unwrap()
    }

    /// Every consecutive pair (including `from` → first cell) is one
    /// orthogonal step.
    pub fn assert_orthogonal(from: GridPos, path: &[GridPos]) {
        let mut prev = from;
        for &p in path {
            assert!(prev.is_adjacent(p), "{prev} → {p} is not a single orthogonal step");
            prev = p;
        }
    }
}

// ── Blockages ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod blockage {
    use fleet_core::{BlockageId, GridBounds, GridPos};

    use super::helpers::wall;
    use crate::{Blockage, BlockageRegistry, GridError, Orientation};

    #[test]
    fn rejects_diagonal_segment() {
        let err = Blockage::segment(GridPos::new(0, 0), GridPos::new(3, 2)).unwrap_err();
        assert!(matches!(err, GridError::NotAxisAligned { .. }));
    }

    #[test]
    fn contains_is_inclusive() {
        let b = wall(15, 8, 12);
        assert_eq!(b.orientation(), Orientation::Vertical);
        assert_eq!(b.cell_count(), 5);
        assert!(b.contains(GridPos::new(15, 8)));
        assert!(b.contains(GridPos::new(15, 12)));
        assert!(!b.contains(GridPos::new(15, 13)));
        assert!(!b.contains(GridPos::new(14, 10)));
    }

    #[test]
    fn reversed_endpoints_enumerate_all_cells() {
        let b = Blockage::segment(GridPos::new(9, 3), GridPos::new(6, 3)).unwrap();
        let cells: Vec<_> = b.cells().collect();
        assert_eq!(cells.len(), 4);
        assert!(cells.iter().all(|c| b.contains(*c)));
    }

    #[test]
    fn registry_tracks_blocked_cells() {
        let mut reg = BlockageRegistry::new(GridBounds::new(30, 30));
        let id = reg.add(wall(15, 8, 12));
        assert_eq!(id, BlockageId(1));
        assert!(reg.is_blocked(GridPos::new(15, 10)));
        assert!(!reg.is_blocked(GridPos::new(16, 10)));

        reg.remove(id).unwrap();
        assert!(!reg.is_blocked(GridPos::new(15, 10)));
        assert!(reg.is_empty());
    }

    #[test]
    fn overlapping_segments_keep_shared_cells_blocked() {
        let mut reg = BlockageRegistry::new(GridBounds::new(30, 30));
        let a = reg.add(wall(5, 0, 5));
        reg.add(Blockage::segment(GridPos::new(3, 3), GridPos::new(7, 3)).unwrap());
        reg.remove(a);
        assert!(reg.is_blocked(GridPos::new(5, 3)));
        assert!(!reg.is_blocked(GridPos::new(5, 1)));
    }

    #[test]
    fn sweep_removes_only_expired() {
        let mut reg = BlockageRegistry::new(GridBounds::new(30, 30));
        reg.add(wall(2, 0, 3));
        reg.add(wall(8, 0, 3).lasting(1_000, 5_000));

        assert!(reg.sweep_expired(5_999).is_empty());
        let gone = reg.sweep_expired(6_000);
        assert_eq!(gone.len(), 1);
        assert_eq!(reg.len(), 1);
        assert!(reg.is_blocked(GridPos::new(2, 1)));
        assert!(!reg.is_blocked(GridPos::new(8, 1)));
    }

    #[test]
    fn congestion_spills_beside_segment() {
        let mut reg = BlockageRegistry::new(GridBounds::new(30, 30));
        let id = reg.add(wall(10, 5, 7).with_traffic_weight(2.0));
        assert_eq!(reg.congestion(GridPos::new(9, 6)), 2.0);
        assert_eq!(reg.congestion(GridPos::new(10, 4)), 2.0);
        assert_eq!(reg.congestion(GridPos::new(12, 6)), 1.0);
        reg.remove(id);
        assert_eq!(reg.congestion(GridPos::new(9, 6)), 1.0);
    }

    #[test]
    fn clear_restarts_ids() {
        let mut reg = BlockageRegistry::new(GridBounds::new(10, 10));
        reg.add(wall(1, 1, 2));
        reg.clear();
        assert!(!reg.is_blocked(GridPos::new(1, 1)));
        assert_eq!(reg.add(wall(3, 1, 2)), BlockageId(1));
    }
}

// ── Routing ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use fleet_core::{GridPos, SimRng, RandomSource};

    use super::helpers::{assert_orthogonal, flat, wall};
    use crate::{AStarRouter, GridError, GridMap, Router, find_path};

    #[test]
    fn same_cell_is_empty() {
        let (traffic, blockages) = flat(10, 10);
        let map = GridMap::new(&traffic, &blockages);
        let p = GridPos::new(4, 4);
        assert!(find_path(&AStarRouter::new(), &map, p, p).is_empty());
    }

    #[test]
    fn flat_map_path_is_manhattan() {
        let (traffic, blockages) = flat(70, 50);
        let map = GridMap::new(&traffic, &blockages);
        let router = AStarRouter::new();
        let mut rng = SimRng::new(11);

        for _ in 0..200 {
            let a = GridPos::new(rng.below(70) as i32, rng.below(50) as i32);
            let b = GridPos::new(rng.below(70) as i32, rng.below(50) as i32);
            let path = find_path(&router, &map, a, b);
            assert_eq!(path.len() as u32, a.manhattan(b), "{a} → {b}");
            assert_orthogonal(a, &path);
            if a != b {
                assert_eq!(path.last(), Some(&b));
            }
        }
    }

    #[test]
    fn detours_around_wall() {
        let (traffic, mut blockages) = flat(30, 30);
        blockages.add(wall(15, 8, 12));
        let map = GridMap::new(&traffic, &blockages);

        let from = GridPos::new(10, 8);
        let to = GridPos::new(20, 8);
        let path = find_path(&AStarRouter::new(), &map, from, to);

        assert!(!path.is_empty());
        assert_eq!(path.last(), Some(&to));
        assert_orthogonal(from, &path);
        for p in &path {
            assert!(!(p.x == 15 && (8..=12).contains(&p.y)), "path crosses wall at {p}");
        }
        assert!(path.len() as u32 > from.manhattan(to));
    }

    #[test]
    fn blocked_goal_yields_empty() {
        let (traffic, mut blockages) = flat(20, 20);
        blockages.add(wall(5, 0, 19));
        let map = GridMap::new(&traffic, &blockages);
        let router = AStarRouter::new();

        let err = router.route(&map, GridPos::new(0, 0), GridPos::new(5, 4)).unwrap_err();
        assert!(matches!(err, GridError::NoRoute { .. }));
        assert!(find_path(&router, &map, GridPos::new(0, 0), GridPos::new(5, 4)).is_empty());
    }

    #[test]
    fn enclosed_goal_yields_empty() {
        let (traffic, mut blockages) = flat(20, 20);
        blockages.add(wall(5, 0, 19));
        let map = GridMap::new(&traffic, &blockages);
        let path = find_path(&AStarRouter::new(), &map, GridPos::new(0, 0), GridPos::new(9, 9));
        assert!(path.is_empty());
    }

    #[test]
    fn off_map_is_an_error() {
        let (traffic, blockages) = flat(10, 10);
        let map = GridMap::new(&traffic, &blockages);
        let err = AStarRouter::new()
            .route(&map, GridPos::new(0, 0), GridPos::new(10, 3))
            .unwrap_err();
        assert!(matches!(err, GridError::OutOfBounds(_)));
    }

    #[test]
    fn budget_bounds_work() {
        let (traffic, blockages) = flat(70, 50);
        let map = GridMap::new(&traffic, &blockages);
        let err = AStarRouter::with_budget(5)
            .route(&map, GridPos::new(0, 0), GridPos::new(69, 49))
            .unwrap_err();
        assert!(matches!(err, GridError::SearchBudgetExceeded(5)));
    }

    #[test]
    fn prefers_low_traffic() {
        let (mut traffic, blockages) = flat(5, 3);
        // Make the middle row expensive; the cheapest 0,1 → 4,1 route leaves it.
        for x in 1..4 {
            traffic.set(GridPos::new(x, 1), 10.0);
        }
        let map = GridMap::new(&traffic, &blockages);
        let route = AStarRouter::new()
            .route(&map, GridPos::new(0, 1), GridPos::new(4, 1))
            .unwrap();
        assert!(route.cells.iter().all(|p| p.y != 1 || p.x == 4 || p.x == 0));
        assert_eq!(route.len(), 6);
    }

    #[test]
    fn no_path_cell_is_ever_blocked() {
        let (traffic, mut blockages) = flat(40, 40);
        let mut rng = SimRng::new(5);
        for _ in 0..12 {
            let x = rng.below(40) as i32;
            let y = rng.below(35) as i32;
            blockages.add(wall(x, y, y + 4));
        }
        let map = GridMap::new(&traffic, &blockages);
        let router = AStarRouter::new();
        for _ in 0..100 {
            let a = GridPos::new(rng.below(40) as i32, rng.below(40) as i32);
            let b = GridPos::new(rng.below(40) as i32, rng.below(40) as i32);
            for p in find_path(&router, &map, a, b) {
                assert!(!blockages.is_blocked(p));
            }
        }
    }
}

// ── Traffic & depots ───────────────────────────────────────────────────────────

#[cfg(test)]
mod field {
    use fleet_core::{Depot, DepotKind, GridConfig, GridPos, Point, SimRng};

    use crate::{DepotIndex, GridError, TrafficField};

    fn depots() -> Vec<Depot> {
        vec![
            Depot::new("Central Plant", GridPos::new(12, 8), DepotKind::Plant),
            Depot::new("North Tank", GridPos::new(42, 42), DepotKind::Tank),
            Depot::new("East Tank", GridPos::new(63, 3), DepotKind::Tank),
        ]
    }

    #[test]
    fn seeded_traffic_peaks_at_depots() {
        let cfg = GridConfig::default();
        let field = TrafficField::seeded(&cfg, [GridPos::new(12, 8)], &mut SimRng::new(3));
        assert!(field.weight(GridPos::new(12, 8)) >= cfg.depot_boost);
        assert!(field.weight(GridPos::new(60, 40)) <= cfg.traffic_baseline);
        assert_eq!(field.weight(GridPos::new(-1, 0)), 0.0);
    }

    #[test]
    fn nearest_depot() {
        let idx = DepotIndex::new(depots()).unwrap();
        assert_eq!(idx.central().pos, GridPos::new(12, 8));
        assert_eq!(idx.nearest(Point::new(40.0, 40.0)).name, "North Tank");
        assert_eq!(idx.nearest(Point::new(60.0, 5.0)).name, "East Tank");
        assert_eq!(idx.nearest(Point::new(13.0, 9.0)).kind, DepotKind::Plant);
        assert!(idx.is_depot(GridPos::new(63, 3)));
    }

    #[test]
    fn requires_plant() {
        let tanks = depots().into_iter().filter(|d| d.kind == DepotKind::Tank).collect();
        assert!(matches!(DepotIndex::new(tanks), Err(GridError::NoCentralDepot)));
    }
}

#[cfg(test)]
mod generate {
    use fleet_core::{Depot, DepotKind, GridBounds, GridPos, SimRng};

    use crate::{BlockageRequest, DepotIndex, GridError, Orientation, plan_segment};

    fn index() -> DepotIndex {
        DepotIndex::new(vec![Depot::new("Plant", GridPos::new(12, 8), DepotKind::Plant)]).unwrap()
    }

    #[test]
    fn random_segments_avoid_depots() {
        let bounds = GridBounds::new(20, 20);
        let depots = index();
        let mut rng = SimRng::new(9);
        for _ in 0..500 {
            let (s, e) = plan_segment(bounds, &depots, &BlockageRequest::default(), (2, 6), &mut rng)
                .unwrap();
            assert!(s.x == e.x || s.y == e.y);
            assert!(bounds.contains(s) && bounds.contains(e));
            let (x0, x1) = (s.x.min(e.x), s.x.max(e.x));
            let (y0, y1) = (s.y.min(e.y), s.y.max(e.y));
            assert!(!((x0..=x1).contains(&12) && (y0..=y1).contains(&8)));
        }
    }

    #[test]
    fn explicit_request_is_honoured() {
        let req = BlockageRequest {
            position:    Some(GridPos::new(3, 3)),
            length:      Some(4),
            orientation: Some(Orientation::Horizontal),
            ..Default::default()
        };
        let got = plan_segment(GridBounds::new(20, 20), &index(), &req, (2, 6), &mut SimRng::new(1));
        assert_eq!(got.unwrap(), (GridPos::new(3, 3), GridPos::new(6, 3)));
    }

    #[test]
    fn explicit_request_over_depot_is_rejected() {
        let req = BlockageRequest {
            position:    Some(GridPos::new(12, 5)),
            length:      Some(5),
            orientation: Some(Orientation::Vertical),
            ..Default::default()
        };
        let err = plan_segment(GridBounds::new(20, 20), &index(), &req, (2, 6), &mut SimRng::new(1))
            .unwrap_err();
        assert!(matches!(err, GridError::CoversDepot { .. }));
    }
}
