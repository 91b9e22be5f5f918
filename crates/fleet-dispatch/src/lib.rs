//! `fleet-dispatch` — orders and who delivers them.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                       |
//! |----------------|----------------------------------------------------------------|
//! | [`order`]      | `Order`, `Priority`, `OrderStatus`, `OrderSource`              |
//! | [`book`]       | `OrderBook` — all orders of a session, validated transitions   |
//! | [`generator`]  | `OrderGenerator`, `OrderRequest` — synthetic and manual orders |
//! | [`feed`]       | `ExternalOrder`, CSV feed loader                               |
//! | [`context`]    | `DispatchContext<'a>` — read-only view for a policy            |
//! | [`policy`]     | `AssignmentPolicy` trait, `Assignment`                         |
//! | [`greedy`]     | `GreedyDispatch` — multi-factor greedy scorer                  |
//! | [`dispatcher`] | `Dispatcher<P>` — applies a policy's plan                      |
//! | [`error`]      | `DispatchError`, `DispatchResult<T>`                           |
//!
//! # Design notes
//!
//! Dispatch runs in two phases, mirroring the vehicle engine:
//!
//! 1. **Plan**: the policy reads a [`DispatchContext`] and returns a list of
//!    [`Assignment`]s.  No mutation.
//! 2. **Apply**: the [`Dispatcher`] checks the plan books no vehicle or order
//!    twice, then updates the order book and starts each vehicle's job.

pub mod book;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod feed;
pub mod generator;
pub mod greedy;
pub mod order;
pub mod policy;

#[cfg(test)]
mod tests;

pub use book::{OrderBook, StatusCounts};
pub use context::DispatchContext;
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, DispatchResult};
pub use feed::{ExternalOrder, load_orders_csv, load_orders_reader};
pub use generator::{OrderGenerator, OrderRequest};
pub use greedy::{GreedyDispatch, ScoreWeights};
pub use order::{FailureReason, Order, OrderSource, OrderStatus, Priority};
pub use policy::{Assignment, AssignmentPolicy};
