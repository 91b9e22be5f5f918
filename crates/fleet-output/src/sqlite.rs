//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! two tables: `vehicle_snapshots` and `stats`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{OutputResult, StatsRow, VehicleSnapshotRow};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        crate::error::ensure_dir(dir)?;
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS vehicle_snapshots (
                 tick        INTEGER NOT NULL,
                 vehicle_id  INTEGER NOT NULL,
                 class       TEXT    NOT NULL,
                 status      TEXT    NOT NULL,
                 x           REAL    NOT NULL,
                 y           REAL    NOT NULL,
                 fuel        REAL    NOT NULL,
                 maintenance REAL    NOT NULL,
                 cargo       INTEGER NOT NULL,
                 order_id    INTEGER,
                 deliveries  INTEGER NOT NULL,
                 distance    REAL    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS stats (
                 tick             INTEGER PRIMARY KEY,
                 now_ms           INTEGER NOT NULL,
                 pending_orders   INTEGER NOT NULL,
                 active_orders    INTEGER NOT NULL,
                 completed_orders INTEGER NOT NULL,
                 failed_orders    INTEGER NOT NULL,
                 fleet_size       INTEGER NOT NULL,
                 busy_vehicles    INTEGER NOT NULL,
                 utilization      REAL    NOT NULL,
                 completion_rate  REAL    NOT NULL,
                 revenue          REAL    NOT NULL,
                 total_costs      REAL    NOT NULL,
                 profit           REAL    NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_vehicles(&mut self, rows: &[VehicleSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO vehicle_snapshots \
                 (tick, vehicle_id, class, status, x, y, fuel, maintenance, \
                  cargo, order_id, deliveries, distance) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for row in rows {
                let order = (row.order_id != u32::MAX).then_some(row.order_id);
                stmt.execute(rusqlite::params![
                    row.tick as i64,
                    row.vehicle_id,
                    row.class,
                    row.status,
                    row.x as f64,
                    row.y as f64,
                    row.fuel as f64,
                    row.maintenance as f64,
                    row.cargo,
                    order,
                    row.deliveries,
                    row.distance as f64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_stats(&mut self, row: &StatsRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO stats \
             (tick, now_ms, pending_orders, active_orders, completed_orders, \
              failed_orders, fleet_size, busy_vehicles, utilization, \
              completion_rate, revenue, total_costs, profit) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            rusqlite::params![
                row.tick as i64,
                row.now_ms as i64,
                row.pending_orders as i64,
                row.active_orders as i64,
                row.completed_orders as i64,
                row.failed_orders as i64,
                row.fleet_size as i64,
                row.busy_vehicles as i64,
                row.utilization,
                row.completion_rate,
                row.revenue,
                row.total_costs,
                row.profit,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
