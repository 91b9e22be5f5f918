//! `fleet-vehicle` — vehicle state and the per-tick state machine.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                          |
//! |-------------|-------------------------------------------------------------------|
//! | [`state`]   | `VehicleStatus` — the lifecycle states                            |
//! | [`vehicle`] | `Vehicle`, `Job` — per-vehicle state and invariant check          |
//! | [`store`]   | `Fleet` — vehicles plus their RNG streams                         |
//! | [`builder`] | `FleetBuilder` — starting fleet from a composition                |
//! | [`engine`]  | `VehicleEngine<R>` — decay, preemption, movement, arrival         |
//! | [`event`]   | `VehicleEvent`, `ReleaseReason` — deltas for the caller to apply  |
//! | [`error`]   | `VehicleError`, `VehicleResult<T>`                                |
//!
//! # Lifecycle
//!
//! ```text
//! idle → picking_up → delivering → returning → idle
//! *    → refueling  → (resume job | returning)
//! *    → maintenance → idle
//! *    → breakdown   → idle
//! ```
//!
//! The engine never touches orders.  Everything the rest of the simulation
//! must learn about (a pickup, a delivery, a released job, a breakdown) comes
//! back from [`VehicleEngine::update`] as a [`VehicleEvent`].

pub mod builder;
pub mod engine;
pub mod error;
pub mod event;
pub mod state;
pub mod store;
pub mod vehicle;


pub use builder::FleetBuilder;
pub use engine::{Surroundings, VehicleEngine};
pub use error::{VehicleError, VehicleResult};
pub use event::{ReleaseReason, VehicleEvent};
pub use state::VehicleStatus;
pub use store::Fleet;
pub use vehicle::{Job, Vehicle};
