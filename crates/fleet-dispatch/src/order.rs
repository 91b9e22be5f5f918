//! Transport orders.

use std::fmt;
use std::str::FromStr;

use fleet_core::{GridPos, OrderConfig, OrderId, PriorityMultipliers, VehicleId};
use fleet_vehicle::Job;

use crate::DispatchError;

// ── Priority ──────────────────────────────────────────────────────────────────

/// Ordered so that `Urgent > High > Medium > Low`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Low, Priority::Medium, Priority::High, Priority::Urgent];

    pub fn multiplier(self, m: &PriorityMultipliers) -> f64 {
        match self {
            Priority::Low    => m.low,
            Priority::Medium => m.medium,
            Priority::High   => m.high,
            Priority::Urgent => m.urgent,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low    => "low",
            Priority::Medium => "medium",
            Priority::High   => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low"    => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high"   => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other    => Err(DispatchError::Parse(format!("unknown priority {other:?}"))),
        }
    }
}

// ── Status ────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OrderStatus {
    #[default]
    Pending,
    Assigned,
    InTransit,
    Completed,
    Failed,
}

impl OrderStatus {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending   => "pending",
            OrderStatus::Assigned  => "assigned",
            OrderStatus::InTransit => "in_transit",
            OrderStatus::Completed => "completed",
            OrderStatus::Failed    => "failed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FailureReason {
    /// The delivery window closed while the order was still pending.
    Expired,
    /// Withdrawn, e.g. superseded by an external feed.
    Cancelled,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OrderSource {
    Synthetic,
    Manual,
    /// Loaded from an external feed; carries the feed's tag.
    External(String),
}

impl OrderSource {
    pub fn is_external(&self) -> bool {
        matches!(self, OrderSource::External(_))
    }
}

// ── Order ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Order {
    pub id:               OrderId,
    pub origin:           GridPos,
    pub origin_name:      Option<String>,
    pub destination:      GridPos,
    pub destination_name: Option<String>,
    pub quantity:         u32,
    pub priority:         Priority,
    pub status:           OrderStatus,
    pub failure:          Option<FailureReason>,
    pub source:           OrderSource,
    pub created_at_ms:    u64,
    pub window_start_ms:  u64,
    pub window_end_ms:    u64,
    pub revenue:          f64,
    pub assigned_vehicle: Option<VehicleId>,
    /// When the order became terminal (completed or failed).
    pub closed_at_ms:     Option<u64>,
}

impl Order {
    /// Pending past the end of its window.
    pub fn is_overdue(&self, now_ms: u64) -> bool {
        self.status == OrderStatus::Pending && now_ms > self.window_end_ms
    }

    /// Snapshot of the fields a vehicle needs to carry this order.
    pub fn to_job(&self, assigned_at_ms: u64) -> Job {
        Job {
            order: self.id,
            origin: self.origin,
            destination: self.destination,
            quantity: self.quantity,
            revenue: self.revenue,
            assigned_at_ms,
            window_end_ms: self.window_end_ms,
        }
    }
}

/// Revenue for carrying `quantity` units from `origin` to `destination`.
pub fn compute_revenue(
    quantity: u32,
    priority: Priority,
    origin: GridPos,
    destination: GridPos,
    cfg: &OrderConfig,
) -> f64 {
    quantity as f64 * cfg.revenue_per_unit * priority.multiplier(&cfg.priority_multipliers)
        + origin.manhattan(destination) as f64 * cfg.revenue_per_cell
}
