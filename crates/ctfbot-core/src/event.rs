// Event records as delivered by the catalog
//
// EventRecord is the raw, undecorated catalog entry. Timestamps stay as the
// catalog's strings; the formatter is the only place that parses them.

use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};

/// A single CTF event from the catalog
///
/// Every field is required. A payload missing any of them fails to decode,
/// which the catalog client reports as `MalformedResponse`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Catalog-assigned event identifier
    pub id: u64,
    /// Event title
    pub title: String,
    /// Canonical event URL
    pub url: String,
    /// Free-text description
    pub description: String,
    /// Logo image URL (may be empty)
    pub logo: String,
    /// Start instant, `YYYY-MM-DDTHH:MM:SS±HH:MM`
    pub start: String,
    /// End instant, `YYYY-MM-DDTHH:MM:SS±HH:MM`
    pub finish: String,
}

/// Round a user-supplied numeric identifier to a catalog event id
///
/// Numeric command options may arrive as floating point; the nearest integer
/// is used. Non-finite values and values below 1 after rounding are rejected.
pub fn normalize_event_id(raw: f64) -> Result<u64> {
    if !raw.is_finite() {
        return Err(BotError::invalid_argument(format!(
            "event id must be a finite number, got {}",
            raw
        )));
    }

    let rounded = raw.round();
    if rounded < 1.0 || rounded >= u64::MAX as f64 {
        return Err(BotError::invalid_argument(format!(
            "event id must be a positive integer, got {}",
            raw
        )));
    }

    Ok(rounded as u64)
}
