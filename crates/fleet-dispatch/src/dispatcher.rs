//! Applies a policy's plan to the order book and the fleet.

use rustc_hash::FxHashSet;

use fleet_grid::Router;
use fleet_vehicle::{Fleet, Surroundings, VehicleEngine};

use crate::{
    Assignment, AssignmentPolicy, DispatchContext, DispatchError, DispatchResult, OrderBook,
};

pub struct Dispatcher<P: AssignmentPolicy> {
    pub policy: P,
}

impl<P: AssignmentPolicy> Dispatcher<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    /// Run one dispatch pass.  Returns the assignments that took effect.
    ///
    /// A plan that names a vehicle or order twice is rejected whole, before
    /// anything is applied.
    pub fn run<R: Router>(
        &self,
        orders: &mut OrderBook,
        fleet: &mut Fleet,
        engine: &VehicleEngine<R>,
        world: &Surroundings<'_>,
    ) -> DispatchResult<Vec<Assignment>> {
        let plan = {
            let ctx = DispatchContext::new(world.now_ms, orders, fleet.as_slice(), &engine.params);
            self.policy.plan(&ctx)
        };
        check_plan(&plan)?;

        let mut applied = Vec::with_capacity(plan.len());
        for a in plan {
            let Some(order) = orders.get(a.order) else {
                return Err(DispatchError::OrderNotFound(a.order));
            };
            let job = order.to_job(world.now_ms);
            let Some(vehicle) = fleet.get_mut(a.vehicle) else {
                tracing::warn!(target: "fleet_dispatch", vehicle = a.vehicle.0, "planned vehicle missing");
                continue;
            };

            orders.assign(a.order, a.vehicle)?;
            if let Err(e) = engine.begin_job(vehicle, job, world) {
                tracing::warn!(
                    target: "fleet_dispatch",
                    vehicle = a.vehicle.0,
                    order = a.order.0,
                    error = %e,
                    "assignment rejected by vehicle"
                );
                orders.release(a.order)?;
                continue;
            }
            applied.push(a);
        }

        if !applied.is_empty() {
            tracing::info!(
                target: "fleet_dispatch",
                now_ms = world.now_ms,
                assigned = applied.len(),
                pending = orders.counts().pending,
                "dispatch pass"
            );
        }
        Ok(applied)
    }
}

fn check_plan(plan: &[Assignment]) -> DispatchResult<()> {
    let mut vehicles = FxHashSet::default();
    let mut orders = FxHashSet::default();
    for a in plan {
        if !vehicles.insert(a.vehicle) {
            return Err(DispatchError::DoubleBookedVehicle(a.vehicle));
        }
        if !orders.insert(a.order) {
            return Err(DispatchError::DoubleBookedOrder(a.order));
        }
    }
    Ok(())
}
