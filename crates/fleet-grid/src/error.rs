//! Grid-subsystem error type.

use thiserror::Error;

use fleet_core::GridPos;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: GridPos, to: GridPos },

    #[error("cell {0} is outside the map")]
    OutOfBounds(GridPos),

    #[error("blockage {start}–{end} is not horizontal or vertical")]
    NotAxisAligned { start: GridPos, end: GridPos },

    #[error("blockage {start}–{end} would cover a depot")]
    CoversDepot { start: GridPos, end: GridPos },

    #[error("no free cell found for a blockage after {0} attempts")]
    NoFreeSegment(u32),

    #[error("route search exceeded {0} node expansions")]
    SearchBudgetExceeded(usize),

    #[error("no plant depot configured")]
    NoCentralDepot,
}

pub type GridResult<T> = Result<T, GridError>;
