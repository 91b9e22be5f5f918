//! `fleet-core` — foundational types for the fleet dispatch simulator.
//!
//! Every other `fleet-*` crate depends on this one.  It has no `fleet-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `VehicleId`, `OrderId`, `BlockageId`, `AlertId`       |
//! | [`grid`]        | `GridPos`, `GridBounds`, continuous `Point`           |
//! | [`time`]        | `Tick`, `SimClock`                                    |
//! | [`rng`]         | `SimRng`, `VehicleRng`, `RandomSource`, `ScriptedRng` |
//! | [`class`]       | `VehicleClass`, `ClassSpec`, `ClassTable`             |
//! | [`config`]      | `FleetConfig` and its sections, `Depot`               |
//! | [`error`]       | `FleetError`, `FleetResult`                           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod class;
pub mod config;
pub mod error;
pub mod grid;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use class::{ClassSpec, ClassTable, VehicleClass};
pub use config::{
    AlertConfig, BlockageConfig, ClockConfig, Depot, DepotKind, FleetConfig, FleetEntry,
    GridConfig, OrderConfig, PriorityMultipliers, VehicleConfig,
};
pub use error::{FleetError, FleetResult};
pub use grid::{GridBounds, GridPos, Point};
pub use ids::{AlertId, BlockageId, OrderId, VehicleId};
pub use rng::{RandomSource, ScriptedRng, SimRng, VehicleRng};
pub use time::{SimClock, Tick};
