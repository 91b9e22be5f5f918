//! Road blockages and the registry the router consults.
//!
//! # Data layout
//!
//! A blockage is an axis-aligned segment of cells, inclusive at both ends.
//! The registry keeps two dense per-cell arrays alongside the segment list:
//!
//! | Array      | Meaning                                                   |
//! |------------|-----------------------------------------------------------|
//! | `blocked`  | number of active blockages covering the cell              |
//! | `spill`    | summed extra congestion from blockages adjacent to it     |
//!
//! so `is_blocked` and `congestion` are O(1) on the router's hot path, and
//! adding or removing a segment touches only its own cells and their
//! neighbours.

use std::fmt;

use fleet_core::{BlockageId, GridBounds, GridPos};

use crate::{GridError, GridResult};

// ── Blockage ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    Low,
    Medium,
    #[default]
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low      => "low",
            Severity::Medium   => "medium",
            Severity::High     => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// An axis-aligned run of impassable cells.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Blockage {
    pub id:             BlockageId,
    pub start:          GridPos,
    pub end:            GridPos,
    pub severity:       Severity,
    pub reason:         String,
    pub created_at_ms:  u64,
    /// Lifetime in simulated ms; `None` is permanent.
    pub duration_ms:    Option<u64>,
    /// Congestion multiplier for the cells beside the segment.
    pub traffic_weight: f32,
}

impl Blockage {
    /// A permanent, high-severity segment.  `start` and `end` must share a row
    /// or a column.
    pub fn segment(start: GridPos, end: GridPos) -> GridResult<Self> {
        if start.x != end.x && start.y != end.y {
            return Err(GridError::NotAxisAligned { start, end });
        }
        Ok(Self {
            id: BlockageId::INVALID,
            start,
            end,
            severity: Severity::High,
            reason: String::from("construction"),
            created_at_ms: 0,
            duration_ms: None,
            traffic_weight: 1.0,
        })
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_traffic_weight(mut self, weight: f32) -> Self {
        self.traffic_weight = weight.max(1.0);
        self
    }

    /// Make the blockage temporary: active from `created_at_ms` for `duration_ms`.
    pub fn lasting(mut self, created_at_ms: u64, duration_ms: u64) -> Self {
        self.created_at_ms = created_at_ms;
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn orientation(&self) -> Orientation {
        if self.start.y == self.end.y { Orientation::Horizontal } else { Orientation::Vertical }
    }

    #[inline]
    pub fn is_permanent(&self) -> bool {
        self.duration_ms.is_none()
    }

    pub fn expires_at_ms(&self) -> Option<u64> {
        self.duration_ms.map(|d| self.created_at_ms.saturating_add(d))
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expires_at_ms().is_some_and(|t| now_ms >= t)
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: GridPos) -> bool {
        let (x0, x1) = (self.start.x.min(self.end.x), self.start.x.max(self.end.x));
        let (y0, y1) = (self.start.y.min(self.end.y), self.start.y.max(self.end.y));
        (x0..=x1).contains(&p.x) && (y0..=y1).contains(&p.y)
    }

    /// Number of cells covered.
    pub fn cell_count(&self) -> u32 {
        self.start.manhattan(self.end) + 1
    }

    /// Cells from `start` to `end` inclusive.
    pub fn cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        let dx = (self.end.x - self.start.x).signum();
        let dy = (self.end.y - self.start.y).signum();
        (0..self.cell_count() as i32).map(move |i| GridPos::new(self.start.x + dx * i, self.start.y + dy * i))
    }

    /// Midpoint cell, used as the blockage's marker position.
    pub fn center(&self) -> GridPos {
        GridPos::new((self.start.x + self.end.x) / 2, (self.start.y + self.end.y) / 2)
    }
}

// ── BlockageRegistry ──────────────────────────────────────────────────────────

pub struct BlockageRegistry {
    bounds:    GridBounds,
    blockages: Vec<Blockage>,
    blocked:   Vec<u16>,
    spill:     Vec<f32>,
    next_id:   BlockageId,
}

impl BlockageRegistry {
    pub fn new(bounds: GridBounds) -> Self {
        let n = bounds.cell_count();
        Self {
            bounds,
            blockages: Vec::new(),
            blocked: vec![0; n],
            spill: vec![0.0; n],
            next_id: BlockageId(1),
        }
    }

    #[inline]
    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// `true` if an active blockage covers `p`.  Cells outside the map are not
    /// "blocked"; bounds are the router's concern.
    #[inline]
    pub fn is_blocked(&self, p: GridPos) -> bool {
        self.bounds.index(p).is_some_and(|i| self.blocked[i] > 0)
    }

    /// Multiplier (≥ 1) on the traffic weight of `p` from adjacent blockages.
    #[inline]
    pub fn congestion(&self, p: GridPos) -> f32 {
        1.0 + self.bounds.index(p).map_or(0.0, |i| self.spill[i])
    }

    /// Register a blockage, allocating an id if it has none.  Cells outside
    /// the map are ignored.
    pub fn add(&mut self, mut blockage: Blockage) -> BlockageId {
        if blockage.id.is_valid() {
            if blockage.id >= self.next_id {
                self.next_id = blockage.id.next();
            }
        } else {
            blockage.id = self.next_id;
            self.next_id = self.next_id.next();
        }
        let id = blockage.id;
        self.apply(&blockage, 1);
        tracing::debug!(
            target: "fleet_grid::blockage",
            blockage = id.0,
            start = %blockage.start,
            end = %blockage.end,
            permanent = blockage.is_permanent(),
            "blockage added"
        );
        self.blockages.push(blockage);
        id
    }

    pub fn remove(&mut self, id: BlockageId) -> Option<Blockage> {
        let pos = self.blockages.iter().position(|b| b.id == id)?;
        let b = self.blockages.remove(pos);
        self.apply(&b, -1);
        Some(b)
    }

    /// Remove every temporary blockage whose lifetime has elapsed.
    pub fn sweep_expired(&mut self, now_ms: u64) -> Vec<Blockage> {
        let (expired, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.blockages)
            .into_iter()
            .partition(|b| b.is_expired(now_ms));
        self.blockages = kept;
        for b in &expired {
            self.apply(b, -1);
        }
        expired
    }

    pub fn get(&self, id: BlockageId) -> Option<&Blockage> {
        self.blockages.iter().find(|b| b.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Blockage> {
        self.blockages.iter()
    }

    pub fn len(&self) -> usize {
        self.blockages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blockages.is_empty()
    }

    /// Drop every blockage and restart id allocation.
    pub fn clear(&mut self) {
        self.blockages.clear();
        self.blocked.fill(0);
        self.spill.fill(0.0);
        self.next_id = BlockageId(1);
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn apply(&mut self, b: &Blockage, sign: i32) {
        let extra = (b.traffic_weight - 1.0).max(0.0) * sign as f32;
        let mut beside: Vec<usize> = Vec::new();

        for cell in b.cells() {
            let Some(i) = self.bounds.index(cell) else { continue };
            self.blocked[i] = if sign > 0 {
                self.blocked[i].saturating_add(1)
            } else {
                self.blocked[i].saturating_sub(1)
            };
            for n in cell.neighbors4() {
                if b.contains(n) {
                    continue;
                }
                if let Some(j) = self.bounds.index(n) {
                    beside.push(j);
                }
            }
        }

        beside.sort_unstable();
        beside.dedup();
        for j in beside {
            self.spill[j] = (self.spill[j] + extra).max(0.0);
        }
    }
}
