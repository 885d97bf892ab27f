// HTTP client for the CTFtime events API

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use ctfbot_core::{BotError, EventCatalog, EventRecord, Result};

pub const DEFAULT_BASE_URL: &str = "https://ctftime.org";

/// CTFtime rejects requests without a browser-like agent
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_11_5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/50.0.2661.102 Safari/537.36";

/// Upper bound on a single catalog request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for `{base}/api/v1/events/`
#[derive(Debug, Clone)]
pub struct CtftimeClient {
    base_url: String,
    http: reqwest::Client,
}

impl Default for CtftimeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CtftimeClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at another host (mirrors, mock servers)
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "CTFtime request");

        let response = self
            .http
            .get(&url)
            .header(header::USER_AGENT, USER_AGENT)
            .query(query)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| BotError::upstream(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(BotError::not_found(format!("CTFtime resource {}", path)));
        }
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "CTFtime returned an error status");
            return Err(BotError::upstream(format!("{} returned {}", url, status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| BotError::upstream(format!("reading body from {} failed: {}", url, e)))?;

        serde_json::from_str(&body).map_err(|e| BotError::malformed(e.to_string()))
    }
}

#[async_trait]
impl EventCatalog for CtftimeClient {
    async fn fetch_by_id(&self, id: u64) -> Result<EventRecord> {
        self.get(&format!("/api/v1/events/{}/", id), &[]).await
    }

    async fn fetch_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<EventRecord>> {
        let query = [
            ("limit", limit.to_string()),
            ("start", start.timestamp().to_string()),
            ("finish", end.timestamp().to_string()),
        ];
        let events: Vec<EventRecord> = self.get("/api/v1/events/", &query).await?;
        debug!(count = events.len(), "Fetched upcoming events");
        Ok(events)
    }
}
