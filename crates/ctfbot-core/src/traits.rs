// Core traits for pluggable backends
//
// These traits allow the workflows to run against different backends:
// - In-memory implementations for tests and dry runs
// - The CTFtime HTTP client and the Discord REST adapter in production

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::event::EventRecord;
use crate::ids::Snowflake;
use crate::workspace::{ChannelGroup, GuildContext, PermissionOverride};

// ============================================================================
// EventCatalog - Source of CTF event records
// ============================================================================

/// Read access to the external event catalog
///
/// Each call is a single request. Implementations do not retry or cache.
#[async_trait]
pub trait EventCatalog: Send + Sync {
    /// Fetch one event by identifier
    async fn fetch_by_id(&self, id: u64) -> Result<EventRecord>;

    /// Fetch up to `limit` events overlapping `[start, end]`
    async fn fetch_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<EventRecord>>;
}

// ============================================================================
// ChatPlatform - Channel and message mutations
// ============================================================================

/// The subset of the chat platform the workflows need
///
/// Every method is one remote call. Failures surface as `BotError::Platform`
/// (or `NotFound` where the platform reports a missing resource).
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Create a channel category, returning its id
    async fn create_category(&self, guild: &GuildContext, name: &str) -> Result<Snowflake>;

    /// Create a text channel under a category
    async fn create_text_channel(
        &self,
        guild: &GuildContext,
        category: Snowflake,
        name: &str,
        overrides: &[PermissionOverride],
    ) -> Result<Snowflake>;

    /// Post a message, returning its id
    async fn send_message(&self, channel: Snowflake, content: &str) -> Result<Snowflake>;

    /// React to a message with a unicode emoji
    async fn add_reaction(&self, channel: Snowflake, message: Snowflake, emoji: &str)
        -> Result<()>;

    /// Snapshot a category and its current children
    ///
    /// Returns `None` when the id does not name a category in the guild.
    async fn fetch_category(
        &self,
        guild: &GuildContext,
        category: Snowflake,
    ) -> Result<Option<ChannelGroup>>;

    /// Delete a channel or category
    async fn delete_channel(&self, channel: Snowflake) -> Result<()>;
}
