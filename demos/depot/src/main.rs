//! depot — headless run of the fleet dispatch simulator on the reference map.
//!
//! Runs a 70×50 grid with three depots and the reference fleet, writes
//! `vehicle_snapshots.csv` and `stats.csv`, and prints a summary.  Orders come
//! from the random generator unless `--orders` points at a CSV feed, in which
//! case the session ends once every feed order is terminal.
//!
//! ```text
//! RUST_LOG=fleet_sim=info cargo run -p depot -- --ticks 3600
//! cargo run -p depot -- --orders demos/depot/data/orders.csv --date 2024-03-01
//! cargo run -p depot -- --live-secs 5 --speed 4
//! ```

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fleet_core::{FleetConfig, Tick};
use fleet_dispatch::{GreedyDispatch, load_orders_csv};
use fleet_grid::AStarRouter;
use fleet_output::{CsvWriter, OutputWriter, SimOutputObserver};
use fleet_sim::{Alert, AlertKind, Sim, SimBuilder, SimHandle, SimObserver, SimulationStatistics};
use fleet_vehicle::Vehicle;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless fleet dispatch simulation", long_about = None)]
struct Cli {
    /// JSON configuration file; missing sections take reference defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Ticks to simulate in the headless run.
    #[arg(long, default_value_t = 3_600)]
    ticks: u64,

    /// CSV order feed replacing random generation.
    #[arg(long)]
    orders: Option<PathBuf>,

    /// Only load feed rows with this date.
    #[arg(long, requires = "orders")]
    date: Option<String>,

    /// Directory for the CSV output.
    #[arg(long, default_value = "output/depot")]
    out: PathBuf,

    /// Write the final snapshot as JSON to this path.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Instead of the headless run, drive the sim in real time for this many
    /// wall-clock seconds.
    #[arg(long)]
    live_secs: Option<u64>,

    /// Real-time speed multiplier for `--live-secs`.
    #[arg(long, default_value_t = 1.0)]
    speed: f32,
}

type DepotSim = Sim<AStarRouter, GreedyDispatch>;

// ── Observer wrapper ──────────────────────────────────────────────────────────

/// Forwards stats to the CSV observer, counts rows, and surfaces warnings.
struct DemoObserver<W: OutputWriter> {
    inner:         SimOutputObserver<W>,
    stats_rows:    usize,
    vehicle_rows:  usize,
    warnings:      usize,
    errors:        usize,
}

impl<W: OutputWriter> DemoObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, stats_rows: 0, vehicle_rows: 0, warnings: 0, errors: 0 }
    }
}

impl<W: OutputWriter> SimObserver for DemoObserver<W> {
    fn on_stats(&mut self, stats: &SimulationStatistics, vehicles: &[Vehicle]) {
        self.stats_rows += 1;
        self.vehicle_rows += vehicles.len();
        self.inner.on_stats(stats, vehicles);
    }

    fn on_alert(&mut self, alert: &Alert) {
        match alert.kind {
            AlertKind::Info => {}
            AlertKind::Warning => self.warnings += 1,
            AlertKind::Error => self.errors += 1,
        }
        info!(target: "depot", kind = %alert.kind, vehicle = ?alert.vehicle, "{}", alert.message);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if cli.live_secs.is_none() {
        config.clock.total_ticks = Some(cli.ticks);
    }

    println!("=== depot — fleet dispatch simulation ===");
    println!(
        "Grid: {}×{}  |  Depots: {}  |  Seed: {}",
        config.grid.width,
        config.grid.height,
        config.depots.len(),
        config.seed
    );

    let mut sim: DepotSim = SimBuilder::standard(config).build()?;
    println!("Fleet: {} vehicles, {} permanent blockages", sim.fleet.len(), sim.blockages.len());

    if let Some(path) = &cli.orders {
        let feed = load_orders_csv(path, cli.date.as_deref())
            .with_context(|| format!("loading orders from {}", path.display()))?;
        let source = path.file_name().map_or_else(|| "feed".to_owned(), |n| n.to_string_lossy().into_owned());
        let loaded = sim.load_external_orders(&feed, &source)?;
        println!("Loaded {loaded} orders from {source}");
    }
    println!();

    let sim = match cli.live_secs {
        Some(secs) => run_live(sim, secs, cli.speed)?,
        None => run_headless(sim, &cli.out)?,
    };

    print_summary(&sim.stats);

    if let Some(path) = &cli.snapshot {
        let json = serde_json::to_string_pretty(&sim.snapshot())?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        println!("Snapshot written to {}", path.display());
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<FleetConfig> {
    let Some(path) = path else {
        return Ok(FleetConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: FleetConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

fn run_headless(mut sim: DepotSim, out: &Path) -> Result<DepotSim> {
    let writer = CsvWriter::new(out)?;
    let mut obs = DemoObserver::new(SimOutputObserver::new(writer));

    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    println!(
        "Simulated {} ticks ({}) in {:.3} s",
        sim.clock.current_tick.0,
        format_hms(sim.clock.elapsed_hms()),
        elapsed.as_secs_f64()
    );
    println!("  {}/stats.csv             : {} rows", out.display(), obs.stats_rows);
    println!("  {}/vehicle_snapshots.csv : {} rows", out.display(), obs.vehicle_rows);
    println!("  alerts: {} warnings, {} errors", obs.warnings, obs.errors);
    println!();
    Ok(sim)
}

fn run_live(sim: DepotSim, secs: u64, speed: f32) -> Result<DepotSim> {
    let handle = SimHandle::spawn(sim);
    let applied = handle.set_speed(speed);
    handle.start();
    println!("Running live for {secs} s at {applied}× speed");

    for _ in 0..secs {
        thread::sleep(Duration::from_secs(1));
        let snap = handle.snapshot();
        println!(
            "  tick {:>6}  state {:?}  pending {:>3}  active {:>3}  completed {:>4}",
            snap.tick.0,
            snap.state,
            snap.stats.pending_orders,
            snap.stats.active_orders,
            snap.stats.completed_orders
        );
    }

    handle.pause();
    let sim = handle.shutdown().context("simulation thread panicked")?;
    println!();
    Ok(sim)
}

fn format_hms((h, m, s): (u64, u32, u32)) -> String {
    format!("{h:02}:{m:02}:{s:02}")
}

fn print_summary(s: &SimulationStatistics) {
    println!("{:<22} {:>12}", "Metric", "Value");
    println!("{}", "-".repeat(35));
    println!("{:<22} {:>12}", "orders", s.total_orders);
    println!("{:<22} {:>12}", "completed", s.completed_orders);
    println!("{:<22} {:>12}", "failed", s.failed_orders);
    println!("{:<22} {:>12}", "on time", s.on_time_deliveries);
    println!("{:<22} {:>11.1}%", "completion rate", s.completion_rate * 100.0);
    println!("{:<22} {:>11.1}%", "utilization", s.utilization * 100.0);
    println!("{:<22} {:>12.1}", "distance", s.total_distance);
    println!("{:<22} {:>12.0}", "avg delivery (ms)", s.average_delivery_ms);
    println!("{:<22} {:>12.2}", "revenue", s.revenue);
    println!("{:<22} {:>12.2}", "costs", s.total_costs);
    println!("{:<22} {:>12.2}", "profit", s.profit);
}
