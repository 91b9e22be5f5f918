//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `vehicle_snapshots.csv`
//! - `stats.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{OutputResult, StatsRow, VehicleSnapshotRow};

pub const VEHICLE_HEADERS: [&str; 12] = [
    "tick", "vehicle_id", "class", "status", "x", "y",
    "fuel", "maintenance", "cargo", "order_id", "deliveries", "distance",
];

pub const STATS_HEADERS: [&str; 13] = [
    "tick", "now_ms", "pending_orders", "active_orders", "completed_orders",
    "failed_orders", "fleet_size", "busy_vehicles", "utilization",
    "completion_rate", "revenue", "total_costs", "profit",
];

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    vehicles: Writer<File>,
    stats:    Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Create the output directory if needed, open both files and write the
    /// header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        crate::error::ensure_dir(dir)?;

        let mut vehicles = Writer::from_path(dir.join("vehicle_snapshots.csv"))?;
        vehicles.write_record(VEHICLE_HEADERS)?;

        let mut stats = Writer::from_path(dir.join("stats.csv"))?;
        stats.write_record(STATS_HEADERS)?;

        Ok(Self { vehicles, stats, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_vehicles(&mut self, rows: &[VehicleSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            // A job-less vehicle leaves the order column empty.
            let order = if row.order_id == u32::MAX { String::new() } else { row.order_id.to_string() };
            self.vehicles.write_record(&[
                row.tick.to_string(),
                row.vehicle_id.to_string(),
                row.class.to_owned(),
                row.status.to_owned(),
                format!("{:.2}", row.x),
                format!("{:.2}", row.y),
                format!("{:.2}", row.fuel),
                format!("{:.2}", row.maintenance),
                row.cargo.to_string(),
                order,
                row.deliveries.to_string(),
                format!("{:.2}", row.distance),
            ])?;
        }
        Ok(())
    }

    fn write_stats(&mut self, row: &StatsRow) -> OutputResult<()> {
        self.stats.write_record(&[
            row.tick.to_string(),
            row.now_ms.to_string(),
            row.pending_orders.to_string(),
            row.active_orders.to_string(),
            row.completed_orders.to_string(),
            row.failed_orders.to_string(),
            row.fleet_size.to_string(),
            row.busy_vehicles.to_string(),
            format!("{:.4}", row.utilization),
            format!("{:.4}", row.completion_rate),
            format!("{:.2}", row.revenue),
            format!("{:.2}", row.total_costs),
            format!("{:.2}", row.profit),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.vehicles.flush()?;
        self.stats.flush()?;
        Ok(())
    }
}
