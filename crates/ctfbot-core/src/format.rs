// Event Formatter
//
// Converts a raw EventRecord into a display-ready EventSummary. The summary
// keeps the instants; how an instant is rendered (date, time, relative) is
// chosen by the caller through TimestampStyle.

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};
use crate::event::EventRecord;

/// strftime pattern for catalog timestamps
pub const EVENT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// How an instant should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampStyle {
    /// Absolute date only
    ShortDate,
    /// Absolute time of day only
    ShortTime,
    /// Relative to the reader's now ("in 3 days")
    Relative,
    /// Full date and time
    LongDateTime,
}

/// Display-oriented projection of an EventRecord
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: u64,
    pub title: String,
    pub url: String,
    pub description: String,
    pub logo: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl EventSummary {
    /// Start as unix seconds
    pub fn start_unix(&self) -> i64 {
        self.start.timestamp()
    }

    /// End as unix seconds
    pub fn end_unix(&self) -> i64 {
        self.end.timestamp()
    }

    /// Length of the event
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Time until the event starts (negative once it has started)
    pub fn starts_in(&self, now: DateTime<Utc>) -> Duration {
        self.start.with_timezone(&Utc) - now
    }

    /// Thumbnail URL, if the catalog supplied one
    pub fn logo_url(&self) -> Option<&str> {
        let logo = self.logo.trim();
        if logo.is_empty() {
            None
        } else {
            Some(logo)
        }
    }
}

/// Parse a catalog timestamp
///
/// Accepts exactly `YYYY-MM-DDTHH:MM:SS±HH:MM`. `Z` suffixes, fractional
/// seconds, missing offsets and single-digit fields are all rejected.
pub fn parse_event_timestamp(value: &str) -> Result<DateTime<FixedOffset>> {
    if !has_timestamp_shape(value) {
        return Err(BotError::malformed_timestamp(value));
    }

    DateTime::parse_from_str(value, EVENT_TIMESTAMP_FORMAT)
        .map_err(|_| BotError::malformed_timestamp(value))
}

fn has_timestamp_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 25 {
        return false;
    }

    bytes.iter().enumerate().all(|(idx, b)| match idx {
        4 | 7 => *b == b'-',
        10 => *b == b'T',
        13 | 16 | 22 => *b == b':',
        19 => *b == b'+' || *b == b'-',
        _ => b.is_ascii_digit(),
    })
}

/// Format a catalog record into a summary
///
/// Fails with `MalformedTimestamp` when either instant does not parse, and
/// with `MalformedResponse` when the event ends before it starts.
pub fn format_event(record: &EventRecord) -> Result<EventSummary> {
    let start = parse_event_timestamp(&record.start)?;
    let end = parse_event_timestamp(&record.finish)?;

    if end < start {
        return Err(BotError::malformed(format!(
            "event {} ends ({}) before it starts ({})",
            record.id, record.finish, record.start
        )));
    }

    Ok(EventSummary {
        id: record.id,
        title: record.title.clone(),
        url: record.url.clone(),
        description: record.description.clone(),
        logo: record.logo.clone(),
        start,
        end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(start: &str, finish: &str) -> EventRecord {
        EventRecord {
            id: 2207,
            title: "Example CTF 2024".to_string(),
            url: "https://ctf.example.org".to_string(),
            description: "Jeopardy style".to_string(),
            logo: "https://ctftime.org/media/events/logo.png".to_string(),
            start: start.to_string(),
            finish: finish.to_string(),
        }
    }

    #[test]
    fn test_format_event() {
        let summary = format_event(&record(
            "2024-03-09T10:00:00+00:00",
            "2024-03-10T22:00:00+02:00",
        ))
        .unwrap();

        assert_eq!(summary.id, 2207);
        assert_eq!(summary.title, "Example CTF 2024");
        assert_eq!(summary.start_unix(), 1709978400);
        assert_eq!(summary.end_unix(), 1710100800);
        assert_eq!(summary.duration(), Duration::hours(34));
        assert_eq!(
            summary.logo_url(),
            Some("https://ctftime.org/media/events/logo.png")
        );
    }

    #[test]
    fn test_zero_length_event_is_valid() {
        let summary = format_event(&record(
            "2024-03-09T10:00:00+00:00",
            "2024-03-09T10:00:00+00:00",
        ))
        .unwrap();
        assert_eq!(summary.duration(), Duration::zero());
    }

    #[test]
    fn test_end_before_start_is_malformed_response() {
        let err = format_event(&record(
            "2024-03-10T10:00:00+00:00",
            "2024-03-09T10:00:00+00:00",
        ))
        .unwrap_err();
        assert!(matches!(err, BotError::MalformedResponse(_)));
    }

    #[test]
    fn test_rejects_non_exact_timestamps() {
        for value in [
            "2024-03-09T10:00:00Z",
            "2024-03-09T10:00:00.123+00:00",
            "2024-03-09 10:00:00+00:00",
            "2024-03-09T10:00:00+0000",
            "2024-3-09T10:00:00+00:00",
            "2024-13-09T10:00:00+00:00",
            "",
        ] {
            let err = parse_event_timestamp(value).unwrap_err();
            assert!(
                matches!(err, BotError::MalformedTimestamp { .. }),
                "expected malformed timestamp for {:?}",
                value
            );
        }
    }

    #[test]
    fn test_negative_offset() {
        let parsed = parse_event_timestamp("2024-03-09T10:00:00-05:00").unwrap();
        assert_eq!(parsed.with_timezone(&Utc).to_rfc3339(), "2024-03-09T15:00:00+00:00");
    }

    #[test]
    fn test_malformed_start_fails_format() {
        let err = format_event(&record("tomorrow", "2024-03-09T10:00:00+00:00")).unwrap_err();
        assert!(matches!(err, BotError::MalformedTimestamp { .. }));
    }

    #[test]
    fn test_starts_in() {
        let summary = format_event(&record(
            "2024-03-09T10:00:00+00:00",
            "2024-03-10T10:00:00+00:00",
        ))
        .unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 8, 10, 0, 0).unwrap();
        assert_eq!(summary.starts_in(now), Duration::days(1));
    }

    #[test]
    fn test_empty_logo() {
        let mut raw = record("2024-03-09T10:00:00+00:00", "2024-03-10T10:00:00+00:00");
        raw.logo = "  ".to_string();
        assert_eq!(format_event(&raw).unwrap().logo_url(), None);
    }
}
