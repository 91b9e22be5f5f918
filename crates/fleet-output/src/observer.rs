//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use fleet_core::Tick;
use fleet_sim::{SimObserver, SimulationStatistics};
use fleet_vehicle::Vehicle;
use tracing::warn;

use crate::row::{StatsRow, VehicleSnapshotRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes vehicle snapshots and statistics rows to any
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    rows:       Vec<VehicleSnapshotRow>,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, rows: Vec::new(), last_error: None }
    }

    /// Take the stored write error, if any.  Only the first error is kept.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                warn!(target: "fleet_output", error = %e, "output write failed");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_stats(&mut self, stats: &SimulationStatistics, vehicles: &[Vehicle]) {
        let result = self.writer.write_stats(&StatsRow::from(stats));
        self.store_err(result);

        self.rows.clear();
        self.rows.extend(vehicles.iter().map(|v| VehicleSnapshotRow::from_vehicle(stats.tick.0, v)));
        if !self.rows.is_empty() {
            let result = self.writer.write_vehicles(&self.rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
