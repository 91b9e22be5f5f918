//! Integration tests for fleet-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::{CsvWriter, STATS_HEADERS, VEHICLE_HEADERS};
    use crate::row::{StatsRow, VehicleSnapshotRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn vehicle_row(vehicle_id: u32, tick: u64, order_id: u32) -> VehicleSnapshotRow {
        VehicleSnapshotRow {
            tick,
            vehicle_id,
            class:       "standard",
            status:      "idle",
            x:           12.0,
            y:           8.0,
            fuel:        60.0,
            maintenance: 100.0,
            cargo:       0,
            order_id,
            deliveries:  0,
            distance:    0.0,
        }
    }

    fn stats_row(tick: u64) -> StatsRow {
        StatsRow {
            tick,
            now_ms:           tick * 1000,
            pending_orders:   2,
            active_orders:    1,
            completed_orders: 3,
            failed_orders:    1,
            fleet_size:       4,
            busy_vehicles:    1,
            utilization:      0.25,
            completion_rate:  0.75,
            revenue:          480.0,
            total_costs:      120.5,
            profit:           359.5,
        }
    }

    fn read(path: std::path::PathBuf) -> Vec<csv::StringRecord> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.records().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("vehicle_snapshots.csv").exists());
        assert!(dir.path().join("stats.csv").exists());
    }

    #[test]
    fn csv_creates_missing_directory() {
        let dir = tmp();
        let nested = dir.path().join("runs").join("a");
        let _w = CsvWriter::new(&nested).unwrap();
        assert!(nested.join("stats.csv").exists());
    }

    #[test]
    fn csv_directory_under_a_file_fails() {
        let dir = tmp();
        let file = dir.path().join("taken");
        std::fs::write(&file, b"x").unwrap();
        let err = CsvWriter::new(&file.join("out")).err().expect("cannot nest under a file");
        assert!(matches!(err, crate::OutputError::OutputDir { .. }), "got {err}");
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("vehicle_snapshots.csv")).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers, VEHICLE_HEADERS);

        let mut rdr2 = csv::Reader::from_path(dir.path().join("stats.csv")).unwrap();
        let headers2: Vec<_> = rdr2.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers2, STATS_HEADERS);
    }

    #[test]
    fn csv_vehicle_rows() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_vehicles(&[vehicle_row(1, 10, u32::MAX), vehicle_row(2, 10, 7)]).unwrap();
        w.finish().unwrap();

        let rows = read(dir.path().join("vehicle_snapshots.csv"));
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "10"); // tick
        assert_eq!(&rows[0][1], "1"); // vehicle_id
        assert_eq!(&rows[0][2], "standard");
        assert_eq!(&rows[0][4], "12.00");
        assert_eq!(&rows[0][9], "", "no job leaves the order column empty");
        assert_eq!(&rows[1][9], "7");
    }

    #[test]
    fn csv_stats_row() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_stats(&stats_row(30)).unwrap();
        w.finish().unwrap();

        let rows = read(dir.path().join("stats.csv"));
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "30");
        assert_eq!(&rows[0][1], "30000");
        assert_eq!(&rows[0][8], "0.2500");
        assert_eq!(&rows[0][12], "359.50");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn csv_empty_batch_ok() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_vehicles(&[]).unwrap();
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use fleet_core::{FleetConfig, FleetEntry, VehicleClass};
    use fleet_sim::SimBuilder;
    use fleet_vehicle::Vehicle;

    use crate::observer::SimOutputObserver;
    use crate::row::VehicleSnapshotRow;
    use crate::{CsvWriter, OutputError, OutputResult, OutputWriter, StatsRow};

    fn quiet_config(total_ticks: u64) -> FleetConfig {
        let mut cfg = FleetConfig::default();
        cfg.blockages.permanent_count = 0;
        cfg.blockages.incident_probability = 0.0;
        cfg.orders.generation_probability = 0.0;
        cfg.vehicle.breakdown_probability = 0.0;
        cfg.clock.total_ticks = Some(total_ticks);
        cfg.fleet = vec![
            FleetEntry { class: VehicleClass::Standard, count: 2 },
            FleetEntry { class: VehicleClass::Mini, count: 1 },
        ];
        cfg
    }

    /// Keeps rows in memory; optionally fails every stats write.
    #[derive(Default)]
    struct MemoryWriter {
        vehicles:   Vec<VehicleSnapshotRow>,
        stats:      Vec<StatsRow>,
        finishes:   usize,
        fail_stats: bool,
    }

    impl OutputWriter for MemoryWriter {
        fn write_vehicles(&mut self, rows: &[VehicleSnapshotRow]) -> OutputResult<()> {
            self.vehicles.extend_from_slice(rows);
            Ok(())
        }

        fn write_stats(&mut self, row: &StatsRow) -> OutputResult<()> {
            if self.fail_stats {
                return Err(OutputError::Io(std::io::Error::other("disk full")));
            }
            self.stats.push(*row);
            Ok(())
        }

        fn finish(&mut self) -> OutputResult<()> {
            self.finishes += 1;
            Ok(())
        }
    }

    #[test]
    fn rows_follow_stats_refreshes() {
        let mut sim = SimBuilder::standard(quiet_config(60)).build().unwrap();
        let mut obs = SimOutputObserver::new(MemoryWriter::default());
        sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none());

        let w = obs.into_writer();
        // Stats refresh at ticks 10, 20, .., 50.
        let ticks: Vec<u64> = w.stats.iter().map(|r| r.tick).collect();
        assert_eq!(ticks, [10, 20, 30, 40, 50]);
        assert_eq!(w.vehicles.len(), 15);
        assert!(w.stats.iter().all(|r| r.fleet_size == 3 && r.completed_orders == 0));
        assert_eq!(w.finishes, 1);
    }

    #[test]
    fn snapshot_row_from_vehicle() {
        let sim = SimBuilder::standard(quiet_config(1)).build().unwrap();
        let v: &Vehicle = sim.fleet.iter().next().unwrap();
        let row = VehicleSnapshotRow::from_vehicle(5, v);
        assert_eq!(row.tick, 5);
        assert_eq!(row.vehicle_id, v.id.0);
        assert_eq!(row.status, "idle");
        assert_eq!(row.order_id, u32::MAX);
        assert_eq!((row.x, row.y), (v.position.x, v.position.y));
    }

    #[test]
    fn first_error_is_kept() {
        let mut sim = SimBuilder::standard(quiet_config(30)).build().unwrap();
        let writer = MemoryWriter { fail_stats: true, ..Default::default() };
        let mut obs = SimOutputObserver::new(writer);
        sim.run(&mut obs).unwrap();

        let err = obs.take_error().expect("stats writes fail");
        assert!(err.to_string().contains("disk full"));
        assert!(obs.take_error().is_none(), "taking the error clears it");
        // Vehicle rows still go through.
        assert_eq!(obs.into_writer().vehicles.len(), 6);
    }

    #[test]
    fn integration_csv() {
        let dir = tempfile::tempdir().unwrap();
        let mut sim = SimBuilder::standard(quiet_config(120)).build().unwrap();
        let mut obs = SimOutputObserver::new(CsvWriter::new(dir.path()).unwrap());
        sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");

        let mut rdr = csv::Reader::from_path(dir.path().join("stats.csv")).unwrap();
        assert_eq!(rdr.records().count(), 11);
        let mut rdr = csv::Reader::from_path(dir.path().join("vehicle_snapshots.csv")).unwrap();
        assert_eq!(rdr.records().count(), 33, "11 refreshes × 3 vehicles");
    }
}

// ── SQLite tests ──────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;

    use crate::row::{StatsRow, VehicleSnapshotRow};
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn row(vehicle_id: u32, order_id: u32) -> VehicleSnapshotRow {
        VehicleSnapshotRow {
            tick: 10, vehicle_id, class: "mini", status: "picking_up",
            x: 3.5, y: 4.0, fuel: 20.0, maintenance: 90.0, cargo: 0,
            order_id, deliveries: 1, distance: 12.5,
        }
    }

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("output.db").exists());
    }

    #[test]
    fn sqlite_vehicle_rows() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_vehicles(&[row(1, 4), row(2, u32::MAX), row(3, 5)]).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM vehicle_snapshots", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 3);

        let order: Option<i64> = conn
            .query_row("SELECT order_id FROM vehicle_snapshots WHERE vehicle_id = 2", [], |r| r.get(0))
            .unwrap();
        assert_eq!(order, None, "no job is stored as NULL");
    }

    #[test]
    fn sqlite_stats_row() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_stats(&StatsRow {
            tick: 20, now_ms: 20_000, pending_orders: 1, active_orders: 2,
            completed_orders: 3, failed_orders: 0, fleet_size: 4, busy_vehicles: 2,
            utilization: 0.5, completion_rate: 1.0, revenue: 300.0,
            total_costs: 50.0, profit: 250.0,
        }).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let (tick, completed, profit): (i64, i64, f64) = conn
            .query_row(
                "SELECT tick, completed_orders, profit FROM stats WHERE tick = 20",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(tick, 20);
        assert_eq!(completed, 3);
        assert_eq!(profit, 250.0);
    }
}
