//! Unit tests for fleet-dispatch.

use fleet_core::{
    ClassTable, Depot, DepotKind, GridBounds, GridPos, OrderConfig, OrderId, VehicleClass,
    VehicleConfig, VehicleId,
};
use fleet_grid::{BlockageRegistry, DepotIndex, GridMap, TrafficField};
use fleet_vehicle::{Fleet, Surroundings, Vehicle};

use crate::{Order, OrderBook, OrderRequest, OrderSource, OrderStatus, Priority};

// ── Helpers ───────────────────────────────────────────────────────────────────

const CENTRAL: GridPos = GridPos::new(12, 8);

fn order(id: u32, origin: GridPos, quantity: u32, priority: Priority, window_end_ms: u64) -> Order {
    Order {
        id: OrderId(id),
        origin,
        origin_name: None,
        destination: GridPos::new(origin.x, origin.y + 5),
        destination_name: None,
        quantity,
        priority,
        status: OrderStatus::Pending,
        failure: None,
        source: OrderSource::Synthetic,
        created_at_ms: 0,
        window_start_ms: 0,
        window_end_ms,
        revenue: 50.0,
        assigned_vehicle: None,
        closed_at_ms: None,
    }
}

fn vehicle(id: u32, class: VehicleClass, at: GridPos) -> Vehicle {
    Vehicle::new(VehicleId(id), class, ClassTable::default().get(class).clone(), at)
}

struct World {
    traffic:   TrafficField,
    blockages: BlockageRegistry,
    depots:    DepotIndex,
}

impl World {
    fn new() -> Self {
        let bounds = GridBounds::new(70, 50);
        Self {
            traffic:   TrafficField::uniform(bounds, 0.0),
            blockages: BlockageRegistry::new(bounds),
            depots:    DepotIndex::new(vec![Depot::new("Central", CENTRAL, DepotKind::Plant)]).unwrap(),
        }
    }

    fn view(&self, now_ms: u64) -> Surroundings<'_> {
        Surroundings { map: GridMap::new(&self.traffic, &self.blockages), depots: &self.depots, now_ms }
    }
}

// ── Order book ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod book {
    use super::*;
    use crate::{DispatchError, FailureReason};

    #[test]
    fn insert_allocates_ids() {
        let mut book = OrderBook::new();
        let mut o = order(0, CENTRAL, 1, Priority::Low, 1000);
        o.id = OrderId::INVALID;
        let a = book.insert(o.clone());
        let b = book.insert(o);
        assert_eq!(a, OrderId(1));
        assert_eq!(b, OrderId(2));
        assert_eq!(book.get(b).unwrap().id, b);
    }

    #[test]
    fn full_lifecycle() {
        let mut book = OrderBook::new();
        let id = book.insert(order(1, CENTRAL, 5, Priority::High, 10_000));
        book.assign(id, VehicleId(3)).unwrap();
        assert_eq!(book.get(id).unwrap().assigned_vehicle, Some(VehicleId(3)));
        book.mark_in_transit(id).unwrap();
        book.complete(id, 4_000).unwrap();
        let o = book.get(id).unwrap();
        assert_eq!(o.status, OrderStatus::Completed);
        assert_eq!(o.closed_at_ms, Some(4_000));
        assert!(book.all_terminal());
    }

    #[test]
    fn release_returns_to_pending() {
        let mut book = OrderBook::new();
        let id = book.insert(order(1, CENTRAL, 5, Priority::High, 10_000));
        book.assign(id, VehicleId(1)).unwrap();
        book.release(id).unwrap();
        let o = book.get(id).unwrap();
        assert_eq!(o.status, OrderStatus::Pending);
        assert_eq!(o.assigned_vehicle, None);
    }

    #[test]
    fn invalid_transitions_are_rejected() {
        let mut book = OrderBook::new();
        let id = book.insert(order(1, CENTRAL, 5, Priority::High, 10_000));
        assert!(matches!(book.complete(id, 1), Err(DispatchError::InvalidTransition { .. })));
        assert!(matches!(book.mark_in_transit(id), Err(DispatchError::InvalidTransition { .. })));
        book.assign(id, VehicleId(1)).unwrap();
        assert!(book.assign(id, VehicleId(2)).is_err());
        assert!(book.cancel(id, 0).is_err());
        assert!(matches!(book.release(OrderId(99)), Err(DispatchError::OrderNotFound(_))));
    }

    #[test]
    fn expiry_only_hits_overdue_pending() {
        let mut book = OrderBook::new();
        let late = book.insert(order(1, CENTRAL, 5, Priority::Low, 1_000));
        let busy = book.insert(order(2, CENTRAL, 5, Priority::Low, 1_000));
        let fresh = book.insert(order(3, CENTRAL, 5, Priority::Low, 9_000));
        book.assign(busy, VehicleId(1)).unwrap();

        assert!(book.expire_overdue(1_000).is_empty());
        assert_eq!(book.expire_overdue(1_001), vec![late]);
        let o = book.get(late).unwrap();
        assert_eq!(o.failure, Some(FailureReason::Expired));
        assert_eq!(book.get(busy).unwrap().status, OrderStatus::Assigned);
        assert_eq!(book.get(fresh).unwrap().status, OrderStatus::Pending);
    }

    #[test]
    fn recent_terminal_is_newest_first() {
        let mut book = OrderBook::new();
        for i in 1..=5 {
            let id = book.insert(order(i, CENTRAL, 1, Priority::Low, 100_000));
            book.cancel(id, i as u64 * 10).unwrap();
        }
        let ids: Vec<_> = book.recent_terminal(3).iter().map(|o| o.id.0).collect();
        assert_eq!(ids, vec![5, 4, 3]);
        let c = book.counts();
        assert_eq!(c.failed, 5);
        assert_eq!(c.active(), 0);
    }
}

// ── Greedy policy ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod greedy {
    use fleet_core::{RandomSource, SimRng};

    use super::*;
    use crate::{AssignmentPolicy, DispatchContext, GreedyDispatch};

    fn plan(orders: &OrderBook, vehicles: &[Vehicle]) -> Vec<crate::Assignment> {
        let params = VehicleConfig::default();
        GreedyDispatch::new().plan(&DispatchContext::new(0, orders, vehicles, &params))
    }

    #[test]
    fn score_matches_formula() {
        let v = vehicle(1, VehicleClass::Standard, GridPos::new(0, 0));
        let o = order(1, GridPos::new(3, 4), 10, Priority::Low, 1000);
        let expected = 0.4 / 6.0 + 0.3 * 0.5 + 0.15 * 1.0 + 0.15 * 1.0;
        assert!((GreedyDispatch::new().score(&v, &o) - expected).abs() < 1e-9);
    }

    #[test]
    fn urgent_orders_choose_first() {
        let mut book = OrderBook::new();
        book.insert(order(1, GridPos::new(13, 8), 5, Priority::Low, 1_000));
        book.insert(order(2, GridPos::new(40, 40), 5, Priority::Urgent, 900_000));
        let vehicles = vec![vehicle(1, VehicleClass::Standard, CENTRAL)];

        let p = plan(&book, &vehicles);
        assert_eq!(p.len(), 1);
        assert_eq!(p[0].order, OrderId(2));
    }

    #[test]
    fn earlier_window_breaks_priority_tie() {
        let mut book = OrderBook::new();
        book.insert(order(1, CENTRAL, 5, Priority::High, 50_000));
        book.insert(order(2, CENTRAL, 5, Priority::High, 10_000));
        let vehicles = vec![vehicle(1, VehicleClass::Standard, CENTRAL)];
        assert_eq!(plan(&book, &vehicles)[0].order, OrderId(2));
    }

    #[test]
    fn ineligible_vehicles_are_skipped() {
        let mut book = OrderBook::new();
        book.insert(order(1, CENTRAL, 15, Priority::High, 50_000));

        let small = vehicle(1, VehicleClass::Mini, CENTRAL);
        let mut thirsty = vehicle(2, VehicleClass::Standard, CENTRAL);
        thirsty.fuel = 15.0;
        let mut worn = vehicle(3, VehicleClass::Standard, CENTRAL);
        worn.maintenance = 30.0;
        assert!(plan(&book, &[small, thirsty, worn]).is_empty());
    }

    #[test]
    fn overdue_orders_are_not_planned() {
        let mut book = OrderBook::new();
        book.insert(order(1, CENTRAL, 5, Priority::Urgent, 4_000));
        book.insert(order(2, CENTRAL, 5, Priority::Low, 60_000));
        let vehicles = vec![
            vehicle(1, VehicleClass::Standard, CENTRAL),
            vehicle(2, VehicleClass::Standard, CENTRAL),
        ];
        let params = VehicleConfig::default();
        let p = GreedyDispatch::new().plan(&DispatchContext::new(5_000, &book, &vehicles, &params));
        assert_eq!(p.len(), 1);
        assert_eq!(p[0].order, OrderId(2));
    }

    #[test]
    fn fuel_floor_is_absolute() {
        let mut book = OrderBook::new();
        book.insert(order(1, CENTRAL, 5, Priority::High, 50_000));

        // A quarter of a 60-unit tank, but not more than 20 units.
        let mut mini = vehicle(1, VehicleClass::Mini, CENTRAL);
        mini.fuel = 15.0;
        assert!(plan(&book, &[mini.clone()]).is_empty());

        // 15% of a 200-unit tank is still 30 units.
        let mut mega = vehicle(2, VehicleClass::Mega, CENTRAL);
        mega.fuel = 30.0;
        let p = plan(&book, &[mini, mega]);
        assert_eq!(p.len(), 1);
        assert_eq!(p[0].vehicle, VehicleId(2));
    }

    #[test]
    fn ties_go_to_first_vehicle() {
        let mut book = OrderBook::new();
        book.insert(order(1, GridPos::new(20, 8), 5, Priority::High, 50_000));
        let vehicles = vec![
            vehicle(7, VehicleClass::Standard, CENTRAL),
            vehicle(8, VehicleClass::Standard, CENTRAL),
        ];
        assert_eq!(plan(&book, &vehicles)[0].vehicle, VehicleId(7));
    }

    #[test]
    fn greedy_can_starve_later_orders() {
        // The only vehicle able to carry 40 units is taken by an urgent
        // 10-unit order it happens to score best on.
        let mut book = OrderBook::new();
        book.insert(order(1, CENTRAL, 10, Priority::Urgent, 50_000));
        book.insert(order(2, CENTRAL, 40, Priority::High, 50_000));
        let vehicles = vec![
            vehicle(1, VehicleClass::Mega, CENTRAL),
            vehicle(2, VehicleClass::Large, GridPos::new(60, 40)),
        ];
        let p = plan(&book, &vehicles);
        assert_eq!(p.len(), 1);
        assert_eq!(p[0].vehicle, VehicleId(1));
        assert_eq!(p[0].order, OrderId(1));
    }

    #[test]
    fn never_double_books_over_random_fleets() {
        for seed in 0..50u64 {
            let mut rng = SimRng::new(seed);
            let mut book = OrderBook::new();
            for i in 1..=20 {
                let at = GridPos::new(rng.below(70) as i32, rng.below(45) as i32);
                let pr = Priority::ALL[rng.below(4) as usize];
                book.insert(order(i, at, 1 + rng.below(50), pr, rng.between(0, 900_000) as u64));
            }
            let vehicles: Vec<_> = (1..=8)
                .map(|i| {
                    let class = VehicleClass::ALL[rng.below(4) as usize];
                    let mut v = vehicle(i, class, GridPos::new(rng.below(70) as i32, rng.below(50) as i32));
                    v.fuel = v.spec.tank_capacity * rng.unit() as f32;
                    v.maintenance = 100.0 * rng.unit() as f32;
                    v
                })
                .collect();

            let p = plan(&book, &vehicles);
            let mut seen_v: Vec<_> = p.iter().map(|a| a.vehicle).collect();
            let mut seen_o: Vec<_> = p.iter().map(|a| a.order).collect();
            seen_v.sort();
            seen_v.dedup();
            seen_o.sort();
            seen_o.dedup();
            assert_eq!(seen_v.len(), p.len(), "seed {seed}: vehicle booked twice");
            assert_eq!(seen_o.len(), p.len(), "seed {seed}: order booked twice");
            for a in &p {
                let v = vehicles.iter().find(|v| v.id == a.vehicle).unwrap();
                let o = book.get(a.order).unwrap();
                assert!(v.spec.capacity >= o.quantity);
                assert!(v.fuel > 20.0 && v.maintenance > 30.0);
            }
        }
    }
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod dispatcher {
    use fleet_grid::AStarRouter;
    use fleet_vehicle::{VehicleEngine, VehicleStatus};

    use super::*;
    use crate::{Assignment, AssignmentPolicy, DispatchContext, DispatchError, Dispatcher, GreedyDispatch};

    struct DoubleBooker;

    impl AssignmentPolicy for DoubleBooker {
        fn plan(&self, ctx: &DispatchContext<'_>) -> Vec<Assignment> {
            ctx.orders
                .pending()
                .map(|o| Assignment { order: o.id, vehicle: ctx.vehicles[0].id, score: 1.0 })
                .collect()
        }
    }

    fn fleet() -> Fleet {
        let mut fleet = Fleet::new(1);
        let table = ClassTable::default();
        fleet.add(VehicleClass::Standard, table.standard.clone(), CENTRAL);
        fleet.add(VehicleClass::Large, table.large, CENTRAL);
        fleet
    }

    #[test]
    fn applies_plan_to_book_and_fleet() {
        let world = World::new();
        let engine = VehicleEngine::new(AStarRouter::new(), VehicleConfig::default());
        let mut fleet = fleet();
        let mut book = OrderBook::new();
        let id = book.insert(order(1, GridPos::new(20, 8), 10, Priority::Urgent, 900_000));

        let applied = Dispatcher::new(GreedyDispatch::new())
            .run(&mut book, &mut fleet, &engine, &world.view(5_000))
            .unwrap();
        assert_eq!(applied.len(), 1);

        let o = book.get(id).unwrap();
        assert_eq!(o.status, OrderStatus::Assigned);
        let v = fleet.get(o.assigned_vehicle.unwrap()).unwrap();
        assert_eq!(v.status, VehicleStatus::PickingUp);
        assert_eq!(v.target, Some(GridPos::new(20, 8)));
        assert_eq!(v.job.as_ref().unwrap().assigned_at_ms, 5_000);
    }

    #[test]
    fn rejects_double_booking_plan() {
        let world = World::new();
        let engine = VehicleEngine::new(AStarRouter::new(), VehicleConfig::default());
        let mut fleet = fleet();
        let mut book = OrderBook::new();
        book.insert(order(1, CENTRAL, 1, Priority::Low, 900_000));
        book.insert(order(2, CENTRAL, 1, Priority::Low, 900_000));

        let err = Dispatcher::new(DoubleBooker)
            .run(&mut book, &mut fleet, &engine, &world.view(0))
            .unwrap_err();
        assert!(matches!(err, DispatchError::DoubleBookedVehicle(_)));
        assert_eq!(book.counts().pending, 2);
        assert!(fleet.iter().all(|v| v.is_available()));
    }

    #[test]
    fn idle_vehicles_only() {
        let world = World::new();
        let engine = VehicleEngine::new(AStarRouter::new(), VehicleConfig::default());
        let mut fleet = fleet();
        let mut book = OrderBook::new();
        book.insert(order(1, GridPos::new(20, 8), 5, Priority::Low, 900_000));
        book.insert(order(2, GridPos::new(30, 8), 5, Priority::Low, 900_000));
        book.insert(order(3, GridPos::new(40, 8), 5, Priority::Low, 900_000));

        let d = Dispatcher::new(GreedyDispatch::new());
        assert_eq!(d.run(&mut book, &mut fleet, &engine, &world.view(0)).unwrap().len(), 2);
        assert_eq!(d.run(&mut book, &mut fleet, &engine, &world.view(0)).unwrap().len(), 0);
        assert_eq!(book.counts().pending, 1);
    }
}

// ── Generator & feed ──────────────────────────────────────────────────────────

#[cfg(test)]
mod generator {
    use fleet_core::SimRng;
    use fleet_grid::Blockage;

    use super::*;
    use crate::{DispatchError, ExternalOrder, OrderGenerator};

    #[test]
    fn random_orders_are_valid() {
        let bounds = GridBounds::new(70, 50);
        let mut blockages = BlockageRegistry::new(bounds);
        blockages.add(Blockage::segment(GridPos::new(10, 0), GridPos::new(10, 49)).unwrap());
        let cfg = OrderConfig::default();
        let generator = OrderGenerator::new(cfg.clone());
        let mut rng = SimRng::new(3);

        for _ in 0..500 {
            let o = generator
                .generate(&OrderRequest::default(), OrderSource::Synthetic, 1_000, &blockages, &mut rng)
                .unwrap();
            assert!(bounds.contains(o.origin) && bounds.contains(o.destination));
            assert_ne!(o.origin, o.destination);
            assert!(!blockages.is_blocked(o.origin) && !blockages.is_blocked(o.destination));
            assert!((cfg.min_quantity..=cfg.max_quantity).contains(&o.quantity));
            let window = o.window_end_ms - o.created_at_ms;
            assert!((cfg.min_window_ms..=cfg.max_window_ms).contains(&window));
            assert!(o.revenue > 0.0);
        }
    }

    #[test]
    fn explicit_fields_and_revenue() {
        let blockages = BlockageRegistry::new(GridBounds::new(70, 50));
        let generator = OrderGenerator::new(OrderConfig::default());
        let req = OrderRequest {
            origin: Some(GridPos::new(20, 8)),
            destination: Some(GridPos::new(20, 20)),
            quantity: Some(10),
            priority: Some(Priority::Urgent),
            window_ms: Some(900_000),
            ..Default::default()
        };
        let o = generator
            .generate(&req, OrderSource::Manual, 0, &blockages, &mut SimRng::new(1))
            .unwrap();
        // 10 units × 10.0 × 2.0 + 12 cells × 2.0
        assert_eq!(o.revenue, 224.0);
        assert_eq!(o.window_end_ms, 900_000);
    }

    #[test]
    fn rejects_off_map_and_empty_orders() {
        let blockages = BlockageRegistry::new(GridBounds::new(70, 50));
        let generator = OrderGenerator::new(OrderConfig::default());
        let off = OrderRequest { origin: Some(GridPos::new(80, 8)), ..Default::default() };
        let empty = OrderRequest { quantity: Some(0), ..Default::default() };
        for req in [off, empty] {
            let err = generator
                .generate(&req, OrderSource::Manual, 0, &blockages, &mut SimRng::new(1))
                .unwrap_err();
            assert!(matches!(err, DispatchError::InvalidRequest(_)));
        }
    }

    #[test]
    fn external_windows_are_relative() {
        let generator = OrderGenerator::new(OrderConfig::default());
        let ext = ExternalOrder {
            origin: GridPos::new(1, 1),
            origin_name: Some("Mill".into()),
            destination: GridPos::new(5, 5),
            destination_name: None,
            quantity: 3,
            priority: Priority::Low,
            window_start_ms: 1_000,
            window_end_ms: 60_000,
        };
        let o = generator.from_external(&ext, "feed", 10_000, GridBounds::new(70, 50)).unwrap();
        assert_eq!(o.window_start_ms, 11_000);
        assert_eq!(o.window_end_ms, 70_000);
        assert_eq!(o.source, OrderSource::External("feed".into()));
        assert_eq!(o.origin_name.as_deref(), Some("Mill"));
    }

    #[test]
    fn external_windows_saturate() {
        let generator = OrderGenerator::new(OrderConfig::default());
        let ext = ExternalOrder {
            origin: GridPos::new(20, 8),
            origin_name: None,
            destination: GridPos::new(20, 20),
            destination_name: None,
            quantity: 4,
            priority: Priority::Low,
            window_start_ms: u64::MAX - 5,
            window_end_ms: u64::MAX,
        };
        let o = generator.from_external(&ext, "feed", 10_000, GridBounds::new(70, 50)).unwrap();
        assert_eq!(o.window_start_ms, u64::MAX);
        assert_eq!(o.window_end_ms, u64::MAX);
        assert_eq!(o.created_at_ms, 10_000);
    }
}

#[cfg(test)]
mod feed {
    use std::io::Cursor;

    use super::*;
    use crate::{DispatchError, load_orders_reader};

    const FEED: &str = "\
date,origin_x,origin_y,destination_x,destination_y,quantity,priority,window_start_ms,window_end_ms,origin_name,destination_name
2024-03-01,20,8,20,20,10,urgent,0,900000,Mill,Harbour
2024-03-01,30,12,45,30,5,low,0,1200000,,
2024-03-02,5,5,60,40,18,High,60000,900000,Quarry,
";

    #[test]
    fn loads_all_rows() {
        let orders = load_orders_reader(Cursor::new(FEED), None).unwrap();
        assert_eq!(orders.len(), 3);
        assert_eq!(orders[0].origin, GridPos::new(20, 8));
        assert_eq!(orders[0].destination_name.as_deref(), Some("Harbour"));
        assert_eq!(orders[1].origin_name, None);
        assert_eq!(orders[2].priority, Priority::High);
        assert_eq!(orders[2].window_start_ms, 60_000);
    }

    #[test]
    fn filters_by_date() {
        let orders = load_orders_reader(Cursor::new(FEED), Some("2024-03-02")).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].quantity, 18);
    }

    #[test]
    fn bad_priority_is_a_parse_error() {
        let bad = "origin_x,origin_y,destination_x,destination_y,quantity,priority,window_end_ms\n1,1,2,2,3,asap,1000\n";
        let err = load_orders_reader(Cursor::new(bad), None).unwrap_err();
        assert!(matches!(err, DispatchError::Parse(_)));
    }
}
