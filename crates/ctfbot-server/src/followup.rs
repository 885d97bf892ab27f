// Followup delivery
//
// Work that outlives the interaction response reports back through a
// followup message. The trait keeps the command handlers testable without
// a Discord connection.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use ctfbot_core::{Result, Snowflake};
use ctfbot_discord::{DiscordRest, ResponseData};

#[async_trait]
pub trait FollowupSink: Send + Sync {
    /// Post a followup for the interaction identified by `token`
    async fn send_followup(
        &self,
        application_id: Snowflake,
        token: &str,
        data: ResponseData,
    ) -> Result<()>;
}

#[async_trait]
impl FollowupSink for DiscordRest {
    async fn send_followup(
        &self,
        application_id: Snowflake,
        token: &str,
        data: ResponseData,
    ) -> Result<()> {
        self.create_followup(application_id, token, &data).await?;
        Ok(())
    }
}

/// A followup captured by `InMemoryFollowups`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFollowup {
    pub application_id: Snowflake,
    pub token: String,
    pub data: ResponseData,
}

/// Collects followups in memory
#[derive(Debug, Default, Clone)]
pub struct InMemoryFollowups {
    sent: Arc<RwLock<Vec<RecordedFollowup>>>,
}

impl InMemoryFollowups {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<RecordedFollowup> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl FollowupSink for InMemoryFollowups {
    async fn send_followup(
        &self,
        application_id: Snowflake,
        token: &str,
        data: ResponseData,
    ) -> Result<()> {
        self.sent.write().await.push(RecordedFollowup {
            application_id,
            token: token.to_string(),
            data,
        });
        Ok(())
    }
}
