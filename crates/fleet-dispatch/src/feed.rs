//! CSV external order feed.
//!
//! # CSV format
//!
//! One row per order.  `date` is an optional grouping key; when the loader
//! is given a date only matching rows are kept.  Window offsets are
//! simulated ms relative to the moment the feed is loaded.
//!
//! ```csv
//! date,origin_x,origin_y,destination_x,destination_y,quantity,priority,window_start_ms,window_end_ms,origin_name,destination_name
//! 2024-03-01,20,8,20,20,10,urgent,0,900000,Mill,Harbour
//! 2024-03-01,30,12,45,30,5,low,0,1200000,,
//! 2024-03-02,5,5,60,40,18,high,60000,900000,Quarry,
//! ```
//!
//! The name columns may be empty or absent.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use fleet_core::GridPos;

use crate::{DispatchError, Priority};

/// One order from an external feed, before it enters the book.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExternalOrder {
    pub origin:           GridPos,
    pub origin_name:      Option<String>,
    pub destination:      GridPos,
    pub destination_name: Option<String>,
    pub quantity:         u32,
    pub priority:         Priority,
    pub window_start_ms:  u64,
    pub window_end_ms:    u64,
}

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct FeedRecord {
    #[serde(default)]
    date:             Option<String>,
    origin_x:         i32,
    origin_y:         i32,
    destination_x:    i32,
    destination_y:    i32,
    quantity:         u32,
    priority:         String,
    #[serde(default)]
    window_start_ms:  Option<u64>,
    window_end_ms:    u64,
    #[serde(default)]
    origin_name:      Option<String>,
    #[serde(default)]
    destination_name: Option<String>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load an order feed from a CSV file, optionally keeping only rows for `date`.
pub fn load_orders_csv(path: &Path, date: Option<&str>) -> Result<Vec<ExternalOrder>, DispatchError> {
    let file = std::fs::File::open(path).map_err(DispatchError::Io)?;
    load_orders_reader(file, date)
}

/// Like [`load_orders_csv`] but accepts any `Read` source.
pub fn load_orders_reader<R: Read>(
    reader: R,
    date: Option<&str>,
) -> Result<Vec<ExternalOrder>, DispatchError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut out = Vec::new();

    for (line, result) in csv_reader.deserialize::<FeedRecord>().enumerate() {
        let row = result.map_err(|e| DispatchError::Parse(e.to_string()))?;
        if date.is_some_and(|want| row.date.as_deref() != Some(want)) {
            continue;
        }
        let priority = row
            .priority
            .parse::<Priority>()
            .map_err(|e| DispatchError::Parse(format!("row {}: {e}", line + 1)))?;
        out.push(ExternalOrder {
            origin:           GridPos::new(row.origin_x, row.origin_y),
            origin_name:      non_empty(row.origin_name),
            destination:      GridPos::new(row.destination_x, row.destination_y),
            destination_name: non_empty(row.destination_name),
            quantity:         row.quantity,
            priority,
            window_start_ms:  row.window_start_ms.unwrap_or(0),
            window_end_ms:    row.window_end_ms,
        });
    }
    Ok(out)
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}
