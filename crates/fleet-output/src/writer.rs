//! The `OutputWriter` trait implemented by all backend writers.

use crate::{OutputResult, StatsRow, VehicleSnapshotRow};

/// Trait implemented by the CSV and SQLite writers.
///
/// The observer never sees these errors directly; they are stored and
/// retrieved with [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write one row per vehicle for a statistics refresh.
    fn write_vehicles(&mut self, rows: &[VehicleSnapshotRow]) -> OutputResult<()>;

    /// Write one statistics row.
    fn write_stats(&mut self, row: &StatsRow) -> OutputResult<()>;

    /// Flush and close all underlying handles.  Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
