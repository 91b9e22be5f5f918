//! Synthetic and manual order creation.
//!
//! Every field of an [`OrderRequest`] is optional.  Missing fields are drawn
//! at random: origin and destination are distinct, on the map, and not under
//! a blockage; quantity and window length come from the configured ranges;
//! priority is uniform over the four levels.  Explicit fields are validated
//! instead.

use fleet_core::{GridBounds, GridPos, OrderConfig, OrderId, RandomSource};
use fleet_grid::BlockageRegistry;

use crate::order::compute_revenue;
use crate::{DispatchError, DispatchResult, ExternalOrder, Order, OrderSource, OrderStatus, Priority};

const MAX_CELL_ATTEMPTS: u32 = 256;

/// Parameters for a new order; `None` means "pick for me".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrderRequest {
    pub origin:           Option<GridPos>,
    pub origin_name:      Option<String>,
    pub destination:      Option<GridPos>,
    pub destination_name: Option<String>,
    pub quantity:         Option<u32>,
    pub priority:         Option<Priority>,
    /// Window length from creation, simulated ms.
    pub window_ms:        Option<u64>,
}

pub struct OrderGenerator {
    pub cfg: OrderConfig,
}

impl OrderGenerator {
    pub fn new(cfg: OrderConfig) -> Self {
        Self { cfg }
    }

    /// Build a pending order from `req`.  The id is left for the book to assign.
    pub fn generate(
        &self,
        req: &OrderRequest,
        source: OrderSource,
        now_ms: u64,
        blockages: &BlockageRegistry,
        rng: &mut impl RandomSource,
    ) -> DispatchResult<Order> {
        let bounds = blockages.bounds();
        let origin = match req.origin {
            Some(p) => checked_cell(bounds, p, "origin")?,
            None => random_free_cell(bounds, blockages, None, rng)?,
        };
        let destination = match req.destination {
            Some(p) => checked_cell(bounds, p, "destination")?,
            None => random_free_cell(bounds, blockages, Some(origin), rng)?,
        };
        if origin == destination {
            return Err(DispatchError::InvalidRequest(format!(
                "origin and destination are both {origin}"
            )));
        }

        let quantity = match req.quantity {
            Some(0) => return Err(DispatchError::InvalidRequest("quantity must be > 0".into())),
            Some(q) => q,
            None => rng.between(self.cfg.min_quantity as i64, self.cfg.max_quantity as i64) as u32,
        };
        let priority = req
            .priority
            .unwrap_or_else(|| Priority::ALL[rng.below(Priority::ALL.len() as u32) as usize]);
        let window = req.window_ms.unwrap_or_else(|| {
            rng.between(self.cfg.min_window_ms as i64, self.cfg.max_window_ms as i64) as u64
        });

        Ok(Order {
            id: OrderId::INVALID,
            origin,
            origin_name: req.origin_name.clone(),
            destination,
            destination_name: req.destination_name.clone(),
            quantity,
            priority,
            status: OrderStatus::Pending,
            failure: None,
            source,
            created_at_ms: now_ms,
            window_start_ms: now_ms,
            window_end_ms: now_ms.saturating_add(window),
            revenue: compute_revenue(quantity, priority, origin, destination, &self.cfg),
            assigned_vehicle: None,
            closed_at_ms: None,
        })
    }

    /// Convert a feed row.  Its window offsets are relative to `now_ms`.
    pub fn from_external(
        &self,
        ext: &ExternalOrder,
        tag: &str,
        now_ms: u64,
        bounds: GridBounds,
    ) -> DispatchResult<Order> {
        let origin = checked_cell(bounds, ext.origin, "origin")?;
        let destination = checked_cell(bounds, ext.destination, "destination")?;
        if ext.quantity == 0 {
            return Err(DispatchError::InvalidRequest("quantity must be > 0".into()));
        }
        if ext.window_end_ms < ext.window_start_ms {
            return Err(DispatchError::InvalidRequest(format!(
                "window {}..{} is inverted",
                ext.window_start_ms, ext.window_end_ms
            )));
        }
        Ok(Order {
            id: OrderId::INVALID,
            origin,
            origin_name: ext.origin_name.clone(),
            destination,
            destination_name: ext.destination_name.clone(),
            quantity: ext.quantity,
            priority: ext.priority,
            status: OrderStatus::Pending,
            failure: None,
            source: OrderSource::External(tag.to_owned()),
            created_at_ms: now_ms,
            window_start_ms: now_ms.saturating_add(ext.window_start_ms),
            window_end_ms: now_ms.saturating_add(ext.window_end_ms),
            revenue: compute_revenue(ext.quantity, ext.priority, origin, destination, &self.cfg),
            assigned_vehicle: None,
            closed_at_ms: None,
        })
    }
}

fn checked_cell(bounds: GridBounds, p: GridPos, what: &str) -> DispatchResult<GridPos> {
    if bounds.contains(p) {
        Ok(p)
    } else {
        Err(DispatchError::InvalidRequest(format!("{what} {p} is outside the map")))
    }
}

fn random_free_cell(
    bounds: GridBounds,
    blockages: &BlockageRegistry,
    avoid: Option<GridPos>,
    rng: &mut impl RandomSource,
) -> DispatchResult<GridPos> {
    for _ in 0..MAX_CELL_ATTEMPTS {
        let p = GridPos::new(rng.below(bounds.width) as i32, rng.below(bounds.height) as i32);
        if !blockages.is_blocked(p) && Some(p) != avoid {
            return Ok(p);
        }
    }
    Err(DispatchError::InvalidRequest("no unblocked cell found".into()))
}
