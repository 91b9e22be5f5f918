//! Multi-factor greedy dispatch.
//!
//! Pending orders are visited most urgent first (priority, then earliest
//! window end, then id).  Each takes the best-scoring eligible vehicle still
//! free in this pass:
//!
//! | Factor      | Term                          | Weight |
//! |-------------|-------------------------------|--------|
//! | proximity   | `1 / (1 + dist)`              | 0.40   |
//! | load fit    | `quantity / capacity`         | 0.30   |
//! | fuel        | `fuel / tank`                 | 0.15   |
//! | maintenance | `maintenance / 100`           | 0.15   |
//!
//! `dist` is the straight-line distance from the vehicle to the order's
//! origin.  A vehicle only replaces the current best on a strictly higher
//! score, so ties go to the vehicle found first.  The pass never backtracks:
//! once claimed, a vehicle is gone for the remaining orders.

use fleet_core::VehicleConfig;
use fleet_vehicle::Vehicle;

use crate::{Assignment, AssignmentPolicy, DispatchContext, Order};

#[derive(Clone, Debug, PartialEq)]
pub struct ScoreWeights {
    pub proximity:   f64,
    pub load:        f64,
    pub fuel:        f64,
    pub maintenance: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self { proximity: 0.4, load: 0.3, fuel: 0.15, maintenance: 0.15 }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GreedyDispatch {
    pub weights: ScoreWeights,
}

impl GreedyDispatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Can `v` take `order` at all?
    pub fn is_candidate(v: &Vehicle, order: &Order, params: &VehicleConfig) -> bool {
        v.is_available()
            && v.maintenance > params.dispatch_min_maintenance
            && v.fuel > params.dispatch_min_fuel
            && v.spec.capacity >= order.quantity
    }

    pub fn score(&self, v: &Vehicle, order: &Order) -> f64 {
        let w = &self.weights;
        let dist = v.position.distance(order.origin.to_point()) as f64;
        w.proximity / (1.0 + dist)
            + w.load * order.quantity as f64 / v.spec.capacity as f64
            + w.fuel * v.fuel_fraction() as f64
            + w.maintenance * v.maintenance as f64 / 100.0
    }
}

impl AssignmentPolicy for GreedyDispatch {
    fn plan(&self, ctx: &DispatchContext<'_>) -> Vec<Assignment> {
        // Overdue orders are left for the sweep to expire.
        let mut pending: Vec<&Order> =
            ctx.orders.pending().filter(|o| !o.is_overdue(ctx.now_ms)).collect();
        pending.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.window_end_ms.cmp(&b.window_end_ms))
                .then(a.id.cmp(&b.id))
        });

        let mut claimed = vec![false; ctx.vehicles.len()];
        let mut plan = Vec::new();

        for order in pending {
            let mut best: Option<(usize, f64)> = None;
            for (i, v) in ctx.vehicles.iter().enumerate() {
                if claimed[i] || !Self::is_candidate(v, order, ctx.params) {
                    continue;
                }
                let s = self.score(v, order);
                if best.is_none_or(|(_, top)| s > top) {
                    best = Some((i, s));
                }
            }
            if let Some((i, score)) = best {
                claimed[i] = true;
                plan.push(Assignment { order: order.id, vehicle: ctx.vehicles[i].id, score });
            }
        }
        plan
    }
}
