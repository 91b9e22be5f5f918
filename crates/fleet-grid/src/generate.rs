//! Placement of new blockage segments.
//!
//! Both the periodic incident generator and the manual trigger go through
//! [`plan_segment`].  Unspecified request fields are drawn at random; a
//! random placement is retried until it avoids every depot cell, while an
//! explicitly positioned request that would cover a depot is rejected.

use fleet_core::{GridBounds, GridPos, RandomSource};

use crate::{DepotIndex, GridError, GridResult, Orientation, Severity};

const MAX_ATTEMPTS: u32 = 64;

/// Manual or generated blockage parameters; every field is optional.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BlockageRequest {
    pub position:    Option<GridPos>,
    pub length:      Option<u32>,
    pub orientation: Option<Orientation>,
    pub duration_ms: Option<u64>,
    pub severity:    Option<Severity>,
    pub reason:      Option<String>,
}

/// Choose start and end cells for a segment of `len_range` cells.
pub fn plan_segment(
    bounds: GridBounds,
    depots: &DepotIndex,
    req: &BlockageRequest,
    len_range: (u32, u32),
    rng: &mut impl RandomSource,
) -> GridResult<(GridPos, GridPos)> {
    let orientation = req.orientation.unwrap_or_else(|| {
        if rng.chance(0.5) { Orientation::Horizontal } else { Orientation::Vertical }
    });
    let len = req
        .length
        .unwrap_or_else(|| rng.between(len_range.0 as i64, len_range.1 as i64) as u32)
        .max(1) as i32;

    let attempts = if req.position.is_some() { 1 } else { MAX_ATTEMPTS };
    for _ in 0..attempts {
        let start = match req.position {
            Some(p) if !bounds.contains(p) => return Err(GridError::OutOfBounds(p)),
            Some(p) => p,
            None => GridPos::new(
                rng.below(bounds.width) as i32,
                rng.below(bounds.height) as i32,
            ),
        };
        let end = bounds.clamp(match orientation {
            Orientation::Horizontal => GridPos::new(start.x + len - 1, start.y),
            Orientation::Vertical   => GridPos::new(start.x, start.y + len - 1),
        });

        let covers_depot = depots.positions().any(|d| {
            let (x0, x1) = (start.x.min(end.x), start.x.max(end.x));
            let (y0, y1) = (start.y.min(end.y), start.y.max(end.y));
            (x0..=x1).contains(&d.x) && (y0..=y1).contains(&d.y)
        });
        if !covers_depot {
            return Ok((start, end));
        }
        if req.position.is_some() {
            return Err(GridError::CoversDepot { start, end });
        }
    }
    Err(GridError::NoFreeSegment(attempts))
}

/// Random incident cause for generated blockages.
pub fn incident_reason(rng: &mut impl RandomSource) -> &'static str {
    const REASONS: [&str; 4] = ["accident", "flooding", "road works", "fallen tree"];
    REASONS[rng.below(REASONS.len() as u32) as usize]
}
