// `ctfinfo`: one event as a rich embed

use ctfbot_core::{
    format_event, normalize_event_id, BotError, EventCatalog, EventSummary, Result,
    TimestampStyle,
};
use ctfbot_discord::{timestamp, CommandData, Embed};

use super::truncate;

/// Discord's limit on embed descriptions
pub const DESCRIPTION_LIMIT: usize = 4096;

pub async fn run(catalog: &dyn EventCatalog, data: &CommandData) -> Result<Embed> {
    let raw = data
        .number("eventid")
        .ok_or_else(|| BotError::invalid_argument("eventid is required"))?;
    let id = normalize_event_id(raw)?;

    let record = catalog.fetch_by_id(id).await?;
    let summary = format_event(&record)?;
    Ok(event_embed(&summary))
}

/// Card layout: dates, then times, then a relative countdown
pub fn event_embed(summary: &EventSummary) -> Embed {
    let start = summary.start_unix();
    let end = summary.end_unix();

    let mut embed = Embed::new()
        .title(summary.title.as_str())
        .url(summary.url.as_str())
        .description(truncate(&summary.description, DESCRIPTION_LIMIT));
    if let Some(logo) = summary.logo_url() {
        embed = embed.thumbnail(logo);
    }

    embed
        .field("Start Date", timestamp(start, TimestampStyle::ShortDate), true)
        .field("End Date", timestamp(end, TimestampStyle::ShortDate), true)
        .spacer()
        .field("Start Time", timestamp(start, TimestampStyle::ShortTime), true)
        .field("End Time", timestamp(end, TimestampStyle::ShortTime), true)
        .spacer()
        .field("When?", timestamp(start, TimestampStyle::Relative), false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctfbot_core::memory::InMemoryEventCatalog;
    use ctfbot_core::EventRecord;
    use serde_json::json;

    fn record() -> EventRecord {
        EventRecord {
            id: 2000,
            title: "ExampleCTF 2024".to_string(),
            url: "https://example.org".to_string(),
            description: "An example competition".to_string(),
            logo: "https://ctftime.org/media/logo.png".to_string(),
            start: "2024-03-09T10:00:00+00:00".to_string(),
            finish: "2024-03-10T20:00:00+00:00".to_string(),
        }
    }

    fn command(value: serde_json::Value) -> CommandData {
        serde_json::from_value(json!({
            "name": "ctfinfo",
            "options": [{"name": "eventid", "type": 10, "value": value}]
        }))
        .unwrap()
    }

    #[test]
    fn test_embed_layout() {
        let embed = event_embed(&format_event(&record()).unwrap());
        assert_eq!(embed.title.as_deref(), Some("ExampleCTF 2024"));
        assert_eq!(embed.url.as_deref(), Some("https://example.org"));
        assert_eq!(
            embed.thumbnail.map(|t| t.url),
            Some("https://ctftime.org/media/logo.png".to_string())
        );

        let fields: Vec<(&str, &str, bool)> = embed
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.value.as_str(), f.inline))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("Start Date", "<t:1709978400:d>", true),
                ("End Date", "<t:1710100800:d>", true),
                ("\u{200b}", "\u{200b}", true),
                ("Start Time", "<t:1709978400:t>", true),
                ("End Time", "<t:1710100800:t>", true),
                ("\u{200b}", "\u{200b}", true),
                ("When?", "<t:1709978400:R>", false),
            ]
        );
    }

    #[test]
    fn test_empty_logo_has_no_thumbnail() {
        let mut event = record();
        event.logo = String::new();
        let embed = event_embed(&format_event(&event).unwrap());
        assert!(embed.thumbnail.is_none());
    }

    #[tokio::test]
    async fn test_run_rounds_event_id() {
        let catalog = InMemoryEventCatalog::new();
        catalog.seed(vec![record()]).await;

        let embed = run(&catalog, &command(json!(1999.6))).await.unwrap();
        assert_eq!(embed.title.as_deref(), Some("ExampleCTF 2024"));
    }

    #[tokio::test]
    async fn test_run_rejects_non_positive_id() {
        let catalog = InMemoryEventCatalog::new();
        let err = run(&catalog, &command(json!(0.2))).await.unwrap_err();
        assert!(matches!(err, BotError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_run_reports_reversed_event() {
        let catalog = InMemoryEventCatalog::new();
        let mut event = record();
        event.finish = "2024-03-08T10:00:00+00:00".to_string();
        catalog.seed(vec![event]).await;

        let err = run(&catalog, &command(json!(2000))).await.unwrap_err();
        assert!(matches!(err, BotError::MalformedResponse(_)));
    }
}
