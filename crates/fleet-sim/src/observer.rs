//! Simulation observer trait for progress reporting and data collection.

use fleet_core::{Tick, VehicleId};
use fleet_vehicle::{Vehicle, VehicleEvent};

use crate::{Alert, SimulationStatistics, TickReport};

/// Callbacks invoked by [`Sim::tick`][crate::Sim::tick] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — delivery counter
///
/// ```rust,ignore
/// struct Deliveries(usize);
///
/// impl SimObserver for Deliveries {
///     fn on_alert(&mut self, alert: &Alert) {
///         if alert.code == AlertCode::OrderCompleted {
///             self.0 += 1;
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before commands are applied.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called for each vehicle delta of the vehicle phase, before it is
    /// booked against the order book and ledger.
    fn on_vehicle_event(&mut self, _vehicle: VehicleId, _event: &VehicleEvent) {}

    /// Called at the end of each tick with a summary of what happened.
    fn on_tick_end(&mut self, _report: &TickReport) {}

    /// Called whenever statistics are recomputed.
    ///
    /// `vehicles` is the fleet at that moment, so output writers can record
    /// a position snapshot alongside the aggregates.
    fn on_stats(&mut self, _stats: &SimulationStatistics, _vehicles: &[Vehicle]) {}

    /// Called once for every alert raised during the tick, oldest first.
    fn on_alert(&mut self, _alert: &Alert) {}

    /// Called once when [`Sim::run`][crate::Sim::run] returns.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
