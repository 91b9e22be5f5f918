//! Bounded, human-readable notices for operators.
//!
//! The log is a fixed-capacity ring: pushing into a full log evicts the
//! oldest entry.  Readers see alerts most-recent-first and, through
//! [`AlertLog::recent`], only those younger than the configured maximum age.

use std::collections::VecDeque;
use std::fmt;

use fleet_core::{AlertConfig, AlertId, VehicleId};

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AlertKind {
    Info,
    Warning,
    Error,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::Info    => "info",
            AlertKind::Warning => "warning",
            AlertKind::Error   => "error",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an alert is about, for filtering without parsing messages.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AlertCode {
    OrderCreated,
    OrderCompleted,
    OrderExpired,
    OrderReleased,
    LowFuel,
    LowMaintenance,
    Breakdown,
    BlockageAdded,
    BlockageCleared,
    VehicleAdded,
    VehicleRemoved,
    FeedLoaded,
    SessionComplete,
    CommandRejected,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Alert {
    pub id:      AlertId,
    pub kind:    AlertKind,
    pub code:    AlertCode,
    pub message: String,
    /// Simulated ms at which the alert was raised.
    pub at_ms:   u64,
    pub vehicle: Option<VehicleId>,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

// ── AlertLog ──────────────────────────────────────────────────────────────────

pub struct AlertLog {
    entries:    VecDeque<Alert>,
    capacity:   usize,
    max_age_ms: u64,
    next_id:    AlertId,
}

impl AlertLog {
    pub fn new(cfg: &AlertConfig) -> Self {
        let capacity = cfg.capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            max_age_ms: cfg.max_age_ms,
            next_id: AlertId(1),
        }
    }

    /// Append an alert, evicting the oldest if the ring is full.
    pub fn push(
        &mut self,
        kind: AlertKind,
        code: AlertCode,
        message: impl Into<String>,
        at_ms: u64,
        vehicle: Option<VehicleId>,
    ) -> &Alert {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        let id = self.next_id;
        self.next_id = id.next();
        self.entries.push_back(Alert { id, kind, code, message: message.into(), at_ms, vehicle });
        &self.entries[self.entries.len() - 1]
    }

    /// Alerts no older than the maximum age at `now_ms`, newest first.
    pub fn recent(&self, now_ms: u64) -> impl Iterator<Item = &Alert> {
        let max_age = self.max_age_ms;
        self.entries.iter().rev().filter(move |a| now_ms.saturating_sub(a.at_ms) <= max_age)
    }

    /// Every retained alert, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.entries.iter().rev()
    }

    /// Drop alerts older than the maximum age.  Returns how many went.
    pub fn sweep(&mut self, now_ms: u64) -> usize {
        let before = self.entries.len();
        let max_age = self.max_age_ms;
        self.entries.retain(|a| now_ms.saturating_sub(a.at_ms) <= max_age);
        before - self.entries.len()
    }

    pub fn count(&self, code: AlertCode) -> usize {
        self.entries.iter().filter(|a| a.code == code).count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.next_id = AlertId(1);
    }
}
