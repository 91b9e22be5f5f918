//! Fluent builder for constructing a [`Sim`].

use std::collections::VecDeque;

use fleet_core::{FleetConfig, SimClock, SimRng};
use fleet_dispatch::{AssignmentPolicy, Dispatcher, GreedyDispatch, OrderBook, OrderGenerator};
use fleet_grid::{AStarRouter, BlockageRegistry, DepotIndex, Router, TrafficField};
use fleet_vehicle::{Fleet, VehicleEngine};

use crate::{AlertLog, CostLedger, RunState, Sim, SimResult, SimulationStatistics};

/// RNG stream for the traffic field, independent of the session stream.
const TRAFFIC_STREAM: u64 = 0x7AFF1C;

/// Fluent builder for [`Sim<R, P>`].
///
/// # Required inputs
///
/// - [`FleetConfig`] — grid, clock periods, depots, fleet composition, …
/// - `R: Router` — the pathfinder (e.g. [`AStarRouter`])
/// - `P: AssignmentPolicy` — the scheduler (e.g. [`GreedyDispatch`])
///
/// [`SimBuilder::standard`] fills in the last two from the config.
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::standard(FleetConfig::default())
///     .seed(7)
///     .build()?;
/// sim.run_ticks(600, &mut NoopObserver)?;
/// ```
pub struct SimBuilder<R: Router, P: AssignmentPolicy> {
    config: FleetConfig,
    router: R,
    policy: P,
}

impl SimBuilder<AStarRouter, GreedyDispatch> {
    /// A* routing (honouring `grid.search_budget`) and greedy dispatch.
    pub fn standard(config: FleetConfig) -> Self {
        let router = match config.grid.search_budget {
            Some(budget) => AStarRouter::with_budget(budget),
            None => AStarRouter::new(),
        };
        Self::new(config, router, GreedyDispatch::new())
    }
}

impl<R: Router, P: AssignmentPolicy> SimBuilder<R, P> {
    pub fn new(config: FleetConfig, router: R, policy: P) -> Self {
        Self { config, router, policy }
    }

    /// Override the master seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Validate the configuration, seed the world, and return a paused [`Sim`].
    pub fn build(self) -> SimResult<Sim<R, P>> {
        let config = self.config;
        config.validate()?;

        let depots = DepotIndex::new(config.depots.clone())?;
        let traffic = TrafficField::seeded(
            &config.grid,
            depots.positions(),
            &mut SimRng::new(config.seed).child(TRAFFIC_STREAM),
        );

        let mut sim = Sim {
            clock:      SimClock::new(config.clock.ms_per_tick),
            state:      RunState::Paused,
            speed:      1.0,
            fleet:      Fleet::new(config.seed),
            orders:     OrderBook::new(),
            blockages:  BlockageRegistry::new(config.grid.bounds()),
            traffic,
            depots,
            alerts:     AlertLog::new(&config.alerts),
            ledger:     CostLedger::default(),
            stats:      SimulationStatistics::default(),
            engine:     VehicleEngine::new(self.router, config.vehicle.clone()),
            dispatcher: Dispatcher::new(self.policy),
            generator:  OrderGenerator::new(config.orders.clone()),
            rng:        SimRng::new(config.seed),
            commands:   VecDeque::new(),
            external:   None,
            fresh:      Vec::new(),
            config,
        };
        sim.reset();

        tracing::info!(
            target: "fleet_sim",
            seed = sim.config.seed,
            vehicles = sim.fleet.len(),
            blockages = sim.blockages.len(),
            "simulation built"
        );
        Ok(sim)
    }
}
