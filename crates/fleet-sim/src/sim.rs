//! The `Sim` struct and its tick loop.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use fleet_core::{
    BlockageId, FleetConfig, OrderId, RandomSource, SimClock, SimRng, Tick, VehicleClass, VehicleId,
};
use fleet_dispatch::{
    AssignmentPolicy, Dispatcher, ExternalOrder, OrderBook, OrderGenerator, OrderRequest, OrderSource,
};
use fleet_grid::{
    Blockage, BlockageRegistry, BlockageRequest, DepotIndex, GridMap, Router, Severity, TrafficField,
    incident_reason, plan_segment,
};
use fleet_vehicle::{Fleet, FleetBuilder, ReleaseReason, Surroundings, VehicleEngine, VehicleEvent};

use crate::{
    Alert, AlertCode, AlertKind, AlertLog, Command, CostLedger, SimError, SimObserver, SimResult,
    SimulationStatistics, Snapshot,
};

/// Allowed range for the wall-clock speed multiplier.
pub const SPEED_RANGE: (f32, f32) = (0.1, 10.0);

// ── Run state ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RunState {
    /// Built or paused; state is kept.
    #[default]
    Paused,
    Running,
    /// An external feed ran out of open orders.
    Completed,
    /// Halted and reset to initial conditions.
    Stopped,
}

impl RunState {
    pub fn as_str(self) -> &'static str {
        match self {
            RunState::Paused    => "paused",
            RunState::Running   => "running",
            RunState::Completed => "completed",
            RunState::Stopped   => "stopped",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one tick did, for observers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub tick:            Tick,
    pub now_ms:          u64,
    pub commands:        usize,
    pub vehicle_events:  usize,
    pub generated:       Option<OrderId>,
    pub incident:        Option<BlockageId>,
    pub assigned:        usize,
    pub expired:         usize,
    pub blockages_freed: usize,
    pub stats_updated:   bool,
    pub completed:       bool,
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The authoritative simulation state and its tick loop.
///
/// `Sim<R, P>` owns every collection.  The vehicle engine and the dispatch
/// policy only ever see borrowed views and hand back deltas
/// ([`VehicleEvent`], assignments), which `tick` applies in a fixed order.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<R: Router, P: AssignmentPolicy> {
    pub config:     FleetConfig,
    pub clock:      SimClock,
    pub state:      RunState,
    /// Wall-clock speed multiplier, within [`SPEED_RANGE`].
    pub speed:      f32,

    pub fleet:      Fleet,
    pub orders:     OrderBook,
    pub blockages:  BlockageRegistry,
    pub traffic:    TrafficField,
    pub depots:     DepotIndex,
    pub alerts:     AlertLog,
    pub ledger:     CostLedger,
    pub stats:      SimulationStatistics,

    pub engine:     VehicleEngine<R>,
    pub dispatcher: Dispatcher<P>,

    pub(crate) generator: OrderGenerator,
    pub(crate) rng:       SimRng,
    pub(crate) commands:  VecDeque<Command>,
    /// Tag of the loaded external feed; `Some` disables generation.
    pub(crate) external:  Option<String>,
    /// Alerts raised since the last observer flush.
    pub(crate) fresh:     Vec<Alert>,
}

impl<R: Router, P: AssignmentPolicy> Sim<R, P> {
    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Resume ticking.  A completed session stays completed until stopped.
    pub fn start(&mut self) {
        match self.state {
            RunState::Completed => {
                tracing::debug!(target: "fleet_sim", "start ignored: session completed");
            }
            RunState::Running => {}
            RunState::Paused | RunState::Stopped => {
                tracing::info!(target: "fleet_sim", tick = self.clock.current_tick.0, "simulation started");
                self.state = RunState::Running;
            }
        }
    }

    pub fn pause(&mut self) {
        if self.state == RunState::Running {
            tracing::info!(target: "fleet_sim", tick = self.clock.current_tick.0, "simulation paused");
            self.state = RunState::Paused;
        }
    }

    /// Halt and reset vehicles, orders, alerts, statistics, blockages, and
    /// the clock.  Ends any external feed session.
    pub fn stop(&mut self) {
        tracing::info!(target: "fleet_sim", tick = self.clock.current_tick.0, "simulation stopped");
        self.reset();
        self.state = RunState::Stopped;
    }

    /// Set the wall-clock speed multiplier.  Returns the clamped value.
    pub fn set_speed(&mut self, speed: f32) -> f32 {
        if speed.is_finite() {
            self.speed = speed.clamp(SPEED_RANGE.0, SPEED_RANGE.1);
        }
        self.speed
    }

    /// Wall-clock time between ticks at the current speed.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(self.config.clock.tick_period_ms as f64 / 1000.0 / self.speed as f64)
    }

    /// Queue a command for the next tick boundary.
    pub fn submit(&mut self, command: Command) {
        self.commands.push_back(command);
    }

    pub fn is_external(&self) -> bool {
        self.external.is_some()
    }

    /// Rebuild every mutable collection from the configuration.
    ///
    /// The traffic field is left alone: it is a pure function of the seed.
    pub(crate) fn reset(&mut self) {
        let central = self.depots.central().pos;
        self.fleet = FleetBuilder::new(self.config.seed, central)
            .classes(self.config.classes.clone())
            .composition(&self.config.fleet)
            .build();
        self.orders.clear();
        self.blockages.clear();
        self.alerts.clear();
        self.ledger = CostLedger::default();
        self.clock.reset();
        self.rng = SimRng::new(self.config.seed);
        self.commands.clear();
        self.external = None;
        self.fresh.clear();
        self.seed_permanent_blockages();
        self.refresh_stats();
    }

    // ── Running ───────────────────────────────────────────────────────────

    /// Start and tick until the session completes, the simulation leaves the
    /// running state, or `clock.total_ticks` is reached.
    ///
    /// Without `total_ticks` and without an external feed this never
    /// returns; use [`SimHandle`][crate::SimHandle] for open-ended runs.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        self.start();
        while self.state == RunState::Running {
            let now = self.clock.current_tick.0;
            if self.config.clock.total_ticks.is_some_and(|total| now >= total) {
                break;
            }
            self.tick(observer)?;
        }
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Tick exactly `n` times, or fewer if the session completes.
    ///
    /// Ignores the run state otherwise, so tests can step a paused sim.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            if self.state == RunState::Completed {
                break;
            }
            self.tick(observer)?;
        }
        Ok(())
    }

    /// Advance the simulation by one tick.
    pub fn tick<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<TickReport> {
        let now = self.clock.current_tick;
        let now_ms = self.clock.now_ms();
        let periods = self.config.clock.clone();
        let mut report = TickReport { tick: now, now_ms, ..Default::default() };

        observer.on_tick_start(now);

        // ── Phase 0: commands ─────────────────────────────────────────────
        while let Some(command) = self.commands.pop_front() {
            report.commands += 1;
            let name = command.name();
            if let Err(e) = self.execute(command) {
                tracing::warn!(target: "fleet_sim", command = name, error = %e, "command rejected");
                self.alert(
                    AlertKind::Error,
                    AlertCode::CommandRejected,
                    format!("Command {name} rejected: {e}"),
                    None,
                );
            }
        }

        // ── Phase 1: vehicles ─────────────────────────────────────────────
        let mut deltas: Vec<(VehicleId, VehicleEvent)> = Vec::new();
        {
            let world = Surroundings {
                map:    GridMap::new(&self.traffic, &self.blockages),
                depots: &self.depots,
                now_ms,
            };
            for (v, rng) in self.fleet.iter_with_rng() {
                let id = v.id;
                deltas.extend(self.engine.update(v, &world, rng).into_iter().map(|e| (id, e)));
            }
        }
        report.vehicle_events = deltas.len();
        for (vehicle, event) in deltas {
            observer.on_vehicle_event(vehicle, &event);
            self.apply_event(vehicle, event);
        }

        // ── Phase 2: order generation and incidents ───────────────────────
        if self.external.is_none()
            && now.is_multiple_of(periods.generation_period)
            && self.rng.chance(self.config.orders.generation_probability)
        {
            report.generated = self.generate_order();
        }
        let incidents = &self.config.blockages;
        if now.is_multiple_of(incidents.incident_period_ticks)
            && self.rng.chance(incidents.incident_probability)
        {
            match self.place_blockage(&BlockageRequest::default()) {
                Ok(id) => report.incident = Some(id),
                Err(e) => tracing::debug!(target: "fleet_sim", error = %e, "no room for incident"),
            }
        }

        // ── Phase 3: dispatch ─────────────────────────────────────────────
        if now.is_multiple_of(periods.dispatch_period) {
            report.assigned = self.dispatch();
        }

        // ── Phase 4: statistics ───────────────────────────────────────────
        if now.is_multiple_of(periods.stats_period) {
            self.refresh_stats();
            observer.on_stats(&self.stats, self.fleet.as_slice());
            report.stats_updated = true;
        }

        // ── Phase 5: sweep ────────────────────────────────────────────────
        if now.is_multiple_of(periods.sweep_period) {
            let (freed, expired) = self.sweep(now_ms);
            report.blockages_freed = freed;
            report.expired = expired;
        }

        // ── Phase 6: external feed completion ─────────────────────────────
        if self.external.is_some() && self.state != RunState::Completed && self.orders.all_terminal() {
            self.complete_session();
            report.completed = true;
        }

        for alert in self.fresh.drain(..) {
            observer.on_alert(&alert);
        }
        observer.on_tick_end(&report);
        self.clock.advance();
        Ok(report)
    }

    /// A fresh, independent view of the current state.
    pub fn snapshot(&self) -> Snapshot {
        let now_ms = self.clock.now_ms();
        let mut orders: Vec<_> = self.orders.active().cloned().collect();
        orders.extend(
            self.orders
                .recent_terminal(self.config.orders.recent_terminal_limit)
                .into_iter()
                .cloned(),
        );
        Snapshot {
            tick: self.clock.current_tick,
            now_ms,
            state: self.state,
            speed: self.speed,
            vehicles: self.fleet.as_slice().to_vec(),
            orders,
            blockages: self.blockages.iter().cloned().collect(),
            depots: self.depots.all().to_vec(),
            alerts: self.alerts.recent(now_ms).cloned().collect(),
            stats: self.stats.clone(),
            external: self.external.clone(),
        }
    }

    // ── Commands ──────────────────────────────────────────────────────────

    /// Apply a command immediately.  [`Sim::submit`] defers to the next tick.
    pub fn execute(&mut self, command: Command) -> SimResult<()> {
        tracing::debug!(target: "fleet_sim", command = command.name(), "applying command");
        match command {
            Command::CreateOrder(req) => self.create_order(&req).map(|_| ()),
            Command::CreateBlockage(req) => self.place_blockage(&req).map(|_| ()),
            Command::ForceBreakdown(id) => self.force_breakdown(id),
            Command::AddVehicle(class) => {
                self.add_vehicle(class);
                Ok(())
            }
            Command::RemoveVehicle(id) => self.remove_vehicle(id),
            Command::LoadExternalOrders { orders, source } => {
                self.load_external_orders(&orders, &source).map(|_| ())
            }
            Command::SetSpeed(speed) => {
                self.set_speed(speed);
                Ok(())
            }
        }
    }

    /// Add a manual order.  Unset request fields are randomized.
    pub fn create_order(&mut self, req: &OrderRequest) -> SimResult<OrderId> {
        let order = self.generator.generate(
            req,
            OrderSource::Manual,
            self.clock.now_ms(),
            &self.blockages,
            &mut self.rng,
        )?;
        let (origin, destination, quantity) = (order.origin, order.destination, order.quantity);
        let id = self.orders.insert(order);
        self.alert(
            AlertKind::Info,
            AlertCode::OrderCreated,
            format!("Order #{} created: {quantity} units {origin} → {destination}", id.0),
            None,
        );
        Ok(id)
    }

    /// Place a temporary blockage.  Unset request fields are randomized.
    pub fn place_blockage(&mut self, req: &BlockageRequest) -> SimResult<BlockageId> {
        let cfg = &self.config.blockages;
        let (start, end) = plan_segment(
            self.blockages.bounds(),
            &self.depots,
            req,
            (cfg.incident_min_len, cfg.incident_max_len),
            &mut self.rng,
        )?;
        let duration = match req.duration_ms {
            Some(ms) => ms,
            None => self.rng.between(cfg.incident_min_ms as i64, cfg.incident_max_ms as i64) as u64,
        };
        let reason = match &req.reason {
            Some(r) => r.clone(),
            None => incident_reason(&mut self.rng).to_owned(),
        };
        let blockage = Blockage::segment(start, end)?
            .with_severity(req.severity.unwrap_or(Severity::High))
            .with_reason(reason.clone())
            .with_traffic_weight(cfg.traffic_weight)
            .lasting(self.clock.now_ms(), duration);
        let id = self.blockages.add(blockage);
        self.alert(
            AlertKind::Warning,
            AlertCode::BlockageAdded,
            format!("Road blocked {start}–{end}: {reason}"),
            None,
        );
        Ok(id)
    }

    pub fn force_breakdown(&mut self, id: VehicleId) -> SimResult<()> {
        let world = Surroundings {
            map:    GridMap::new(&self.traffic, &self.blockages),
            depots: &self.depots,
            now_ms: self.clock.now_ms(),
        };
        let vehicle = self.fleet.get_mut(id).ok_or(SimError::VehicleNotFound(id))?;
        let events = self.engine.force_breakdown(vehicle, &world);
        for event in events {
            self.apply_event(id, event);
        }
        Ok(())
    }

    /// Add a vehicle of `class`, parked at the central depot.
    pub fn add_vehicle(&mut self, class: VehicleClass) -> VehicleId {
        let spec = self.config.classes.get(class).clone();
        let id = self.fleet.add(class, spec, self.depots.central().pos);
        self.alert(
            AlertKind::Info,
            AlertCode::VehicleAdded,
            format!("{class} #{} joined the fleet", id.0),
            Some(id),
        );
        id
    }

    /// Remove a vehicle.  Its job, if any, goes back to pending.
    pub fn remove_vehicle(&mut self, id: VehicleId) -> SimResult<()> {
        let vehicle = self.fleet.get_mut(id).ok_or(SimError::VehicleNotFound(id))?;
        let events = self.engine.release_for_removal(vehicle);
        for event in events {
            self.apply_event(id, event);
        }
        if let Some(v) = self.fleet.remove(id) {
            self.alert(
                AlertKind::Info,
                AlertCode::VehicleRemoved,
                format!("{} #{} left the fleet", v.class, id.0),
                Some(id),
            );
        }
        Ok(())
    }

    /// Switch to an external, finite order set.
    ///
    /// Still-pending synthetic and manual orders are cancelled and generation
    /// stops.
    /// The whole feed is validated before anything changes.  Returns the
    /// number of orders loaded.
    pub fn load_external_orders(&mut self, feed: &[ExternalOrder], source: &str) -> SimResult<usize> {
        let now_ms = self.clock.now_ms();
        let bounds = self.blockages.bounds();
        let orders = feed
            .iter()
            .map(|ext| self.generator.from_external(ext, source, now_ms, bounds))
            .collect::<Result<Vec<_>, _>>()?;

        let synthetic: Vec<OrderId> = self
            .orders
            .pending()
            .filter(|o| !o.source.is_external())
            .map(|o| o.id)
            .collect();
        for id in &synthetic {
            self.orders.cancel(*id, now_ms)?;
        }

        let loaded = orders.len();
        for order in orders {
            self.orders.insert(order);
        }
        self.external = Some(source.to_owned());

        tracing::info!(
            target: "fleet_sim",
            source,
            loaded,
            cancelled = synthetic.len(),
            "external orders loaded"
        );
        self.alert(
            AlertKind::Info,
            AlertCode::FeedLoaded,
            format!("Loaded {loaded} orders from {source}; {} pending orders cancelled", synthetic.len()),
            None,
        );
        Ok(loaded)
    }

    // ── Phases ────────────────────────────────────────────────────────────

    /// Book one vehicle delta against the order book, ledger, and alert log.
    fn apply_event(&mut self, vehicle: VehicleId, event: VehicleEvent) {
        self.ledger.record(&event);
        let label = self
            .fleet
            .get(vehicle)
            .map(|v| format!("{} #{}", v.class, vehicle.0))
            .unwrap_or_else(|| format!("Vehicle #{}", vehicle.0));

        match event {
            VehicleEvent::PickedUp { order } => {
                if let Err(e) = self.orders.mark_in_transit(order) {
                    tracing::warn!(target: "fleet_sim", order = order.0, error = %e, "pickup for unknown order");
                }
            }
            VehicleEvent::Delivered { order, at_ms, revenue, on_time } => {
                if let Err(e) = self.orders.complete(order, at_ms) {
                    tracing::warn!(target: "fleet_sim", order = order.0, error = %e, "delivery for unknown order");
                    return;
                }
                let lateness = if on_time { "" } else { " (late)" };
                self.alert(
                    AlertKind::Info,
                    AlertCode::OrderCompleted,
                    format!("Order #{} delivered by {label}{lateness}, revenue {revenue:.2}", order.0),
                    Some(vehicle),
                );
            }
            VehicleEvent::OrderReleased { order, reason } => {
                if let Err(e) = self.orders.release(order) {
                    tracing::warn!(target: "fleet_sim", order = order.0, error = %e, "release for unknown order");
                    return;
                }
                tracing::debug!(
                    target: "fleet_sim",
                    order = order.0,
                    vehicle = vehicle.0,
                    reason = reason.as_str(),
                    "order back to pending"
                );
                if reason == ReleaseReason::Stalled {
                    self.alert(
                        AlertKind::Warning,
                        AlertCode::OrderReleased,
                        format!("{label} found no route; order #{} is pending again", order.0),
                        Some(vehicle),
                    );
                }
            }
            VehicleEvent::LowFuel { fuel } => {
                self.alert(
                    AlertKind::Warning,
                    AlertCode::LowFuel,
                    format!("{label} low on fuel ({fuel:.1}), heading to refuel"),
                    Some(vehicle),
                );
            }
            VehicleEvent::LowMaintenance { level } => {
                self.alert(
                    AlertKind::Warning,
                    AlertCode::LowMaintenance,
                    format!("{label} needs maintenance ({level:.0}%)"),
                    Some(vehicle),
                );
            }
            VehicleEvent::BrokeDown => {
                self.alert(
                    AlertKind::Error,
                    AlertCode::Breakdown,
                    format!("{label} broke down"),
                    Some(vehicle),
                );
            }
            VehicleEvent::PathUnavailable { target } => {
                tracing::debug!(target: "fleet_sim", vehicle = vehicle.0, %target, "no path");
            }
            VehicleEvent::Refueled { .. } | VehicleEvent::Serviced { .. } | VehicleEvent::Repaired { .. } => {}
        }
    }

    fn generate_order(&mut self) -> Option<OrderId> {
        match self.generator.generate(
            &OrderRequest::default(),
            OrderSource::Synthetic,
            self.clock.now_ms(),
            &self.blockages,
            &mut self.rng,
        ) {
            Ok(order) => {
                let id = self.orders.insert(order);
                tracing::debug!(target: "fleet_sim", order = id.0, "synthetic order");
                Some(id)
            }
            Err(e) => {
                tracing::debug!(target: "fleet_sim", error = %e, "order generation skipped");
                None
            }
        }
    }

    fn dispatch(&mut self) -> usize {
        let world = Surroundings {
            map:    GridMap::new(&self.traffic, &self.blockages),
            depots: &self.depots,
            now_ms: self.clock.now_ms(),
        };
        match self.dispatcher.run(&mut self.orders, &mut self.fleet, &self.engine, &world) {
            Ok(applied) => applied.len(),
            Err(e) => {
                tracing::warn!(target: "fleet_sim", error = %e, "dispatch plan rejected");
                0
            }
        }
    }

    fn refresh_stats(&mut self) {
        self.stats = SimulationStatistics::compute(
            self.clock.current_tick,
            self.clock.now_ms(),
            &self.fleet,
            &self.orders,
            &self.ledger,
        );
    }

    /// Returns (blockages freed, orders expired).
    fn sweep(&mut self, now_ms: u64) -> (usize, usize) {
        self.alerts.sweep(now_ms);

        let freed = self.blockages.sweep_expired(now_ms);
        for b in &freed {
            self.alert(
                AlertKind::Info,
                AlertCode::BlockageCleared,
                format!("Road reopened {}–{} ({})", b.start, b.end, b.reason),
                None,
            );
        }

        let expired = self.orders.expire_overdue(now_ms);
        for id in &expired {
            tracing::warn!(target: "fleet_sim", order = id.0, "order expired");
            self.alert(
                AlertKind::Warning,
                AlertCode::OrderExpired,
                format!("Order #{} expired before pickup", id.0),
                None,
            );
        }
        (freed.len(), expired.len())
    }

    fn complete_session(&mut self) {
        self.state = RunState::Completed;
        self.refresh_stats();
        let source = self.external.clone().unwrap_or_default();
        tracing::info!(
            target: "fleet_sim",
            source = source.as_str(),
            tick = self.clock.current_tick.0,
            completed = self.stats.completed_orders,
            failed = self.stats.failed_orders,
            "external feed complete"
        );
        self.alert(
            AlertKind::Info,
            AlertCode::SessionComplete,
            format!(
                "All orders from {source} closed: {} completed, {} failed",
                self.stats.completed_orders, self.stats.failed_orders
            ),
            None,
        );
    }

    pub(crate) fn seed_permanent_blockages(&mut self) {
        let cfg = self.config.blockages.clone();
        for _ in 0..cfg.permanent_count {
            let placed = plan_segment(
                self.blockages.bounds(),
                &self.depots,
                &BlockageRequest::default(),
                (cfg.permanent_min_len, cfg.permanent_max_len),
                &mut self.rng,
            )
            .and_then(|(start, end)| Blockage::segment(start, end));
            match placed {
                Ok(b) => {
                    self.blockages.add(b.with_traffic_weight(cfg.traffic_weight));
                }
                Err(e) => tracing::warn!(target: "fleet_sim", error = %e, "construction site skipped"),
            }
        }
    }

    fn alert(&mut self, kind: AlertKind, code: AlertCode, message: String, vehicle: Option<VehicleId>) {
        let alert = self.alerts.push(kind, code, message, self.clock.now_ms(), vehicle).clone();
        self.fresh.push(alert);
    }
}
