// `upcoming`: events starting within the next week
//
// Each event takes three inline fields. Events fill an embed up to Discord's
// field limit and continue in further embeds of the same message. Whatever
// does not fit in the message limits is counted in the header.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use ctfbot_core::{parse_event_timestamp, EventCatalog, EventRecord, Result, TimestampStyle};
use ctfbot_discord::{timestamp, Embed, EmbedField};

use super::truncate;

pub const WINDOW_DAYS: i64 = 7;
pub const FETCH_LIMIT: u32 = 100;

pub const TITLE: &str = "Upcoming CTF Events";
pub const DESCRIPTION: &str = "Here are the upcoming CTF events in the next 7 days.";

// Discord message limits
pub const MAX_FIELDS_PER_EMBED: usize = 25;
pub const MAX_EMBEDS: usize = 10;
/// Sum of titles, descriptions, field names and values over all embeds
pub const MAX_MESSAGE_EMBED_CHARS: usize = 6000;
const FIELD_NAME_LIMIT: usize = 256;
const FIELD_VALUE_LIMIT: usize = 1024;

const FIELDS_PER_EVENT: usize = 3;

/// Room kept free for the "more not shown" note
const OVERFLOW_NOTE_RESERVE: usize = 64;

pub async fn run(catalog: &dyn EventCatalog, now: DateTime<Utc>) -> Result<Vec<Embed>> {
    let events = catalog
        .fetch_range(now, now + Duration::days(WINDOW_DAYS), FETCH_LIMIT)
        .await?;
    debug!(count = events.len(), "Upcoming events fetched");
    upcoming_embeds(&events)
}

fn field(name: &str, value: &str) -> EmbedField {
    EmbedField {
        name: truncate(name, FIELD_NAME_LIMIT),
        value: truncate(value, FIELD_VALUE_LIMIT),
        inline: true,
    }
}

fn event_fields(event: &EventRecord) -> Result<[EmbedField; FIELDS_PER_EVENT]> {
    let start = parse_event_timestamp(&event.start)?;
    Ok([
        field(&event.title, &event.url),
        field("Event ID", &event.id.to_string()),
        field(
            "Start Date",
            &timestamp(start.timestamp(), TimestampStyle::LongDateTime),
        ),
    ])
}

fn field_chars(fields: &[EmbedField]) -> usize {
    fields
        .iter()
        .map(|f| f.name.chars().count() + f.value.chars().count())
        .sum()
}

/// Lay out every event; the first embed carries the title and description
///
/// Fails with `MalformedTimestamp` if any event's start does not parse.
pub fn upcoming_embeds(events: &[EventRecord]) -> Result<Vec<Embed>> {
    let rows = events
        .iter()
        .map(event_fields)
        .collect::<Result<Vec<_>>>()?;

    let mut embeds = vec![Embed::new().title(TITLE).description(DESCRIPTION)];
    let mut used = TITLE.chars().count() + DESCRIPTION.chars().count() + OVERFLOW_NOTE_RESERVE;
    let mut listed = 0;

    for row in rows {
        let cost = field_chars(&row);
        let current_full = embeds
            .last()
            .map_or(true, |e| e.fields.len() + FIELDS_PER_EVENT > MAX_FIELDS_PER_EMBED);
        if used + cost > MAX_MESSAGE_EMBED_CHARS || (current_full && embeds.len() == MAX_EMBEDS) {
            break;
        }
        if current_full {
            embeds.push(Embed::new());
        }
        if let Some(embed) = embeds.last_mut() {
            embed.fields.extend(row);
        }
        used += cost;
        listed += 1;
    }

    let omitted = events.len() - listed;
    if omitted > 0 {
        debug!(listed, omitted, "Upcoming list truncated to message limits");
        embeds[0].description = Some(format!(
            "{}\n\n...and {} more not shown.",
            DESCRIPTION, omitted
        ));
    }

    Ok(embeds)
}
