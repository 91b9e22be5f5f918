//! `fleet-sim` — the tick driver for the fleet dispatch simulator.
//!
//! # Tick order
//!
//! ```text
//! every tick:
//!   ⓪ Commands   — queued manual commands are applied at the tick boundary.
//!   ① Vehicles   — VehicleEngine::update for each vehicle; the returned
//!                  VehicleEvents are applied to the order book, cost ledger,
//!                  and alert log in fleet order.
//!   ② Generation — every `generation_period` ticks, maybe one synthetic
//!                  order (never while an external feed is loaded).
//!      Incidents  — every `incident_period_ticks` ticks, maybe one
//!                  temporary blockage.
//!   ③ Dispatch   — every `dispatch_period` ticks, one scheduler pass.
//!   ④ Statistics — every `stats_period` ticks.
//!   ⑤ Sweep      — every `sweep_period` ticks: aged alerts, expired
//!                  blockages, overdue pending orders.
//!   ⑥ Completion — with an external feed, stop once every order is terminal.
//! ```
//!
//! # Crate layout
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`sim`]      | `Sim<R, P>`, `RunState`, `TickReport`                    |
//! | [`builder`]  | `SimBuilder` — validated construction from `FleetConfig` |
//! | [`handle`]   | `SimHandle` — driver thread, command channel, snapshots  |
//! | [`command`]  | `Command` — manual triggers                              |
//! | [`alerts`]   | `AlertLog` ring buffer                                   |
//! | [`stats`]    | `SimulationStatistics`, `CostLedger`                     |
//! | [`snapshot`] | `Snapshot`, `Entity`                                     |
//! | [`observer`] | `SimObserver` hooks                                      |
//!
//! # Quick-start
//!
//! ```rust,no_run
//! use fleet_core::FleetConfig;
//! use fleet_sim::{NoopObserver, SimBuilder};
//!
//! let mut config = FleetConfig::default();
//! config.clock.total_ticks = Some(3_600);
//! let mut sim = SimBuilder::standard(config).build()?;
//! sim.run(&mut NoopObserver)?;
//! println!("{}", sim.stats.completed_orders);
//! # Ok::<(), fleet_sim::SimError>(())
//! ```

pub mod alerts;
pub mod builder;
pub mod command;
pub mod error;
pub mod handle;
pub mod observer;
pub mod sim;
pub mod snapshot;
pub mod stats;


pub use alerts::{Alert, AlertCode, AlertKind, AlertLog};
pub use builder::SimBuilder;
pub use command::Command;
pub use error::{SimError, SimResult};
pub use handle::SimHandle;
pub use observer::{NoopObserver, SimObserver};
pub use sim::{RunState, Sim, TickReport};
pub use snapshot::{Entity, Snapshot};
pub use stats::{CostLedger, SimulationStatistics};
