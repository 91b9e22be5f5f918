//! The session's order book.
//!
//! Orders live in insertion order in a `Vec`, with an `FxHashMap` from id to
//! slot for O(1) lookups.  Terminal orders are kept for statistics and are
//! never removed within a session; only [`OrderBook::clear`] drops them.
//!
//! # Transitions
//!
//! | From                   | To          | Method                 |
//! |------------------------|-------------|------------------------|
//! | pending                | assigned    | `assign`               |
//! | assigned               | in_transit  | `mark_in_transit`      |
//! | assigned / in_transit  | completed   | `complete`             |
//! | assigned / in_transit  | pending     | `release`              |
//! | pending                | failed      | `cancel`, `expire_overdue` |
//!
//! Anything else is a [`DispatchError::InvalidTransition`].

use rustc_hash::FxHashMap;

use fleet_core::{OrderId, VehicleId};

use crate::{DispatchError, DispatchResult, FailureReason, Order, OrderStatus};

/// Number of orders in each status.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending:    usize,
    pub assigned:   usize,
    pub in_transit: usize,
    pub completed:  usize,
    pub failed:     usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.assigned + self.in_transit + self.completed + self.failed
    }

    pub fn active(&self) -> usize {
        self.pending + self.assigned + self.in_transit
    }
}

#[derive(Default)]
pub struct OrderBook {
    orders:  Vec<Order>,
    index:   FxHashMap<OrderId, usize>,
    next_id: u32,
}

impl OrderBook {
    pub fn new() -> Self {
        Self { next_id: 1, ..Self::default() }
    }

    /// Add an order, allocating an id if it has none.
    pub fn insert(&mut self, mut order: Order) -> OrderId {
        if !order.id.is_valid() {
            order.id = OrderId(self.next_id.max(1));
        }
        self.next_id = self.next_id.max(order.id.0 + 1);
        let id = order.id;
        self.index.insert(id, self.orders.len());
        self.orders.push(order);
        id
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.index.get(&id).map(|&i| &self.orders[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    pub fn pending(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| o.status == OrderStatus::Pending)
    }

    /// Orders not yet completed or failed.
    pub fn active(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| !o.status.is_terminal())
    }

    /// Up to `limit` terminal orders, most recently closed first.
    pub fn recent_terminal(&self, limit: usize) -> Vec<&Order> {
        let mut done: Vec<&Order> = self.orders.iter().filter(|o| o.status.is_terminal()).collect();
        done.sort_by(|a, b| b.closed_at_ms.cmp(&a.closed_at_ms).then(b.id.cmp(&a.id)));
        done.truncate(limit);
        done
    }

    pub fn counts(&self) -> StatusCounts {
        let mut c = StatusCounts::default();
        for o in &self.orders {
            match o.status {
                OrderStatus::Pending   => c.pending += 1,
                OrderStatus::Assigned  => c.assigned += 1,
                OrderStatus::InTransit => c.in_transit += 1,
                OrderStatus::Completed => c.completed += 1,
                OrderStatus::Failed    => c.failed += 1,
            }
        }
        c
    }

    /// `true` when every order is completed or failed (vacuously for an empty book).
    pub fn all_terminal(&self) -> bool {
        self.orders.iter().all(|o| o.status.is_terminal())
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn clear(&mut self) {
        self.orders.clear();
        self.index.clear();
        self.next_id = 1;
    }

    // ── Transitions ───────────────────────────────────────────────────────

    pub fn assign(&mut self, id: OrderId, vehicle: VehicleId) -> DispatchResult<()> {
        let o = self.transition(id, &[OrderStatus::Pending], OrderStatus::Assigned)?;
        o.assigned_vehicle = Some(vehicle);
        Ok(())
    }

    pub fn mark_in_transit(&mut self, id: OrderId) -> DispatchResult<()> {
        self.transition(id, &[OrderStatus::Assigned], OrderStatus::InTransit)?;
        Ok(())
    }

    pub fn complete(&mut self, id: OrderId, at_ms: u64) -> DispatchResult<()> {
        let o = self.transition(
            id,
            &[OrderStatus::Assigned, OrderStatus::InTransit],
            OrderStatus::Completed,
        )?;
        o.closed_at_ms = Some(at_ms);
        Ok(())
    }

    /// Hand an order back to the pool after its vehicle gave it up.
    pub fn release(&mut self, id: OrderId) -> DispatchResult<()> {
        let o = self.transition(
            id,
            &[OrderStatus::Assigned, OrderStatus::InTransit],
            OrderStatus::Pending,
        )?;
        o.assigned_vehicle = None;
        Ok(())
    }

    pub fn cancel(&mut self, id: OrderId, at_ms: u64) -> DispatchResult<()> {
        let o = self.transition(id, &[OrderStatus::Pending], OrderStatus::Failed)?;
        o.failure = Some(FailureReason::Cancelled);
        o.closed_at_ms = Some(at_ms);
        Ok(())
    }

    /// Fail every pending order whose window has closed.  Returns their ids.
    pub fn expire_overdue(&mut self, now_ms: u64) -> Vec<OrderId> {
        let mut expired = Vec::new();
        for o in self.orders.iter_mut().filter(|o| o.is_overdue(now_ms)) {
            o.status = OrderStatus::Failed;
            o.failure = Some(FailureReason::Expired);
            o.closed_at_ms = Some(now_ms);
            expired.push(o.id);
        }
        expired
    }

    fn transition(
        &mut self,
        id: OrderId,
        allowed_from: &[OrderStatus],
        to: OrderStatus,
    ) -> DispatchResult<&mut Order> {
        let &i = self.index.get(&id).ok_or(DispatchError::OrderNotFound(id))?;
        let o = &mut self.orders[i];
        if !allowed_from.contains(&o.status) {
            return Err(DispatchError::InvalidTransition { order: id, from: o.status, to });
        }
        o.status = to;
        Ok(o)
    }
}
