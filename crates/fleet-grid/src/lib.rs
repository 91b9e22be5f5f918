//! `fleet-grid` — the map a fleet drives on, and how to route across it.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`traffic`]  | `TrafficField`: per-cell traffic weight                    |
//! | [`blockage`] | `Blockage`, `BlockageRegistry`, `Severity`, `Orientation`  |
//! | [`generate`] | `BlockageRequest`, random segment placement                |
//! | [`depot`]    | `DepotIndex`: R-tree nearest-depot lookup                  |
//! | [`router`]   | `GridMap`, `Router` trait, `Route`, `AStarRouter`          |
//! | [`error`]    | `GridError`, `GridResult<T>`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod blockage;
pub mod depot;
pub mod error;
pub mod generate;
pub mod router;
pub mod traffic;

#[cfg(test)]
mod tests;

pub use blockage::{Blockage, BlockageRegistry, Orientation, Severity};
pub use depot::DepotIndex;
pub use error::{GridError, GridResult};
pub use generate::{BlockageRequest, incident_reason, plan_segment};
pub use router::{AStarRouter, GridMap, Route, Router, find_path};
pub use traffic::TrafficField;
