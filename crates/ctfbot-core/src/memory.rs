// In-memory implementations for tests and dry runs
//
// These implementations keep all state in memory, making them suitable for:
// - Unit and integration tests of the workflows
// - Running the server without touching a real guild

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{BotError, Result};
use crate::event::EventRecord;
use crate::format::parse_event_timestamp;
use crate::ids::Snowflake;
use crate::traits::{ChatPlatform, EventCatalog};
use crate::workspace::{ChannelGroup, GroupChannel, GuildContext, PermissionOverride};

// ============================================================================
// InMemoryChatPlatform - Records every mutation
// ============================================================================

/// Platform operations, used for call counting and failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformOperation {
    CreateCategory,
    CreateChannel,
    SendMessage,
    AddReaction,
    FetchCategory,
    DeleteChannel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Category,
    Text,
}

/// A channel or category held by the in-memory platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredChannel {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub name: String,
    pub kind: ChannelKind,
    pub parent: Option<Snowflake>,
    pub overrides: Vec<PermissionOverride>,
}

/// A posted message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub id: Snowflake,
    pub channel: Snowflake,
    pub content: String,
    pub reactions: Vec<String>,
}

#[derive(Debug, Default)]
struct PlatformState {
    next_id: u64,
    /// Channels in creation order
    channels: Vec<StoredChannel>,
    messages: Vec<StoredMessage>,
    calls: Vec<PlatformOperation>,
    /// Operation -> 1-based call number that should fail
    failures: HashMap<PlatformOperation, usize>,
}

impl PlatformState {
    fn allocate_id(&mut self) -> Snowflake {
        self.next_id += 1;
        Snowflake(1_000 + self.next_id)
    }

    /// Record a call and apply any injected failure
    fn record(&mut self, op: PlatformOperation) -> Result<()> {
        self.calls.push(op);
        let count = self.calls.iter().filter(|c| **c == op).count();
        match self.failures.get(&op) {
            Some(nth) if *nth == count => Err(BotError::platform(format!(
                "injected failure on {:?} call {}",
                op, count
            ))),
            _ => Ok(()),
        }
    }

    fn channel(&self, id: Snowflake) -> Option<&StoredChannel> {
        self.channels.iter().find(|c| c.id == id)
    }
}

/// In-memory chat platform
#[derive(Debug, Default, Clone)]
pub struct InMemoryChatPlatform {
    state: Arc<RwLock<PlatformState>>,
}

impl InMemoryChatPlatform {
    /// Create an empty platform
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `nth` (1-based) call of `op` fail
    pub async fn fail_on(&self, op: PlatformOperation, nth: usize) {
        self.state.write().await.failures.insert(op, nth);
    }

    /// Pre-create a standalone text channel (e.g. the announcements channel)
    pub async fn add_text_channel(&self, guild_id: Snowflake, name: &str) -> Snowflake {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        state.channels.push(StoredChannel {
            id,
            guild_id,
            name: name.to_string(),
            kind: ChannelKind::Text,
            parent: None,
            overrides: Vec::new(),
        });
        id
    }

    /// Pre-create a category with the given children
    pub async fn add_category(&self, guild_id: Snowflake, name: &str, children: &[&str]) -> Snowflake {
        let mut state = self.state.write().await;
        let category = state.allocate_id();
        state.channels.push(StoredChannel {
            id: category,
            guild_id,
            name: name.to_string(),
            kind: ChannelKind::Category,
            parent: None,
            overrides: Vec::new(),
        });
        for child in children {
            let id = state.allocate_id();
            state.channels.push(StoredChannel {
                id,
                guild_id,
                name: child.to_string(),
                kind: ChannelKind::Text,
                parent: Some(category),
                overrides: Vec::new(),
            });
        }
        category
    }

    /// Operations performed so far, in order
    pub async fn calls(&self) -> Vec<PlatformOperation> {
        self.state.read().await.calls.clone()
    }

    pub async fn call_count(&self, op: PlatformOperation) -> usize {
        self.state
            .read()
            .await
            .calls
            .iter()
            .filter(|c| **c == op)
            .count()
    }

    /// All categories currently present
    pub async fn categories(&self) -> Vec<StoredChannel> {
        self.state
            .read()
            .await
            .channels
            .iter()
            .filter(|c| c.kind == ChannelKind::Category)
            .cloned()
            .collect()
    }

    /// Children of a category, in creation order
    pub async fn channels_in(&self, category: Snowflake) -> Vec<StoredChannel> {
        self.state
            .read()
            .await
            .channels
            .iter()
            .filter(|c| c.parent == Some(category))
            .cloned()
            .collect()
    }

    pub async fn channel(&self, id: Snowflake) -> Option<StoredChannel> {
        self.state.read().await.channel(id).cloned()
    }

    /// Messages posted into a channel, in order
    pub async fn messages_in(&self, channel: Snowflake) -> Vec<StoredMessage> {
        self.state
            .read()
            .await
            .messages
            .iter()
            .filter(|m| m.channel == channel)
            .cloned()
            .collect()
    }

    /// Every message posted so far
    pub async fn messages(&self) -> Vec<StoredMessage> {
        self.state.read().await.messages.clone()
    }

    /// Rename a channel out-of-band
    pub async fn rename_channel(&self, id: Snowflake, name: &str) {
        let mut state = self.state.write().await;
        if let Some(channel) = state.channels.iter_mut().find(|c| c.id == id) {
            channel.name = name.to_string();
        }
    }
}

#[async_trait]
impl ChatPlatform for InMemoryChatPlatform {
    async fn create_category(&self, guild: &GuildContext, name: &str) -> Result<Snowflake> {
        let mut state = self.state.write().await;
        state.record(PlatformOperation::CreateCategory)?;
        let id = state.allocate_id();
        state.channels.push(StoredChannel {
            id,
            guild_id: guild.guild_id,
            name: name.to_string(),
            kind: ChannelKind::Category,
            parent: None,
            overrides: Vec::new(),
        });
        Ok(id)
    }

    async fn create_text_channel(
        &self,
        guild: &GuildContext,
        category: Snowflake,
        name: &str,
        overrides: &[PermissionOverride],
    ) -> Result<Snowflake> {
        let mut state = self.state.write().await;
        state.record(PlatformOperation::CreateChannel)?;
        match state.channel(category) {
            Some(parent) if parent.kind == ChannelKind::Category => {}
            _ => return Err(BotError::platform(format!("Unknown category {}", category))),
        }
        let id = state.allocate_id();
        state.channels.push(StoredChannel {
            id,
            guild_id: guild.guild_id,
            name: name.to_string(),
            kind: ChannelKind::Text,
            parent: Some(category),
            overrides: overrides.to_vec(),
        });
        Ok(id)
    }

    async fn send_message(&self, channel: Snowflake, content: &str) -> Result<Snowflake> {
        let mut state = self.state.write().await;
        state.record(PlatformOperation::SendMessage)?;
        match state.channel(channel) {
            Some(target) if target.kind == ChannelKind::Text => {}
            _ => return Err(BotError::platform(format!("Unknown Channel {}", channel))),
        }
        let id = state.allocate_id();
        state.messages.push(StoredMessage {
            id,
            channel,
            content: content.to_string(),
            reactions: Vec::new(),
        });
        Ok(id)
    }

    async fn add_reaction(
        &self,
        channel: Snowflake,
        message: Snowflake,
        emoji: &str,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state.record(PlatformOperation::AddReaction)?;
        let target = state
            .messages
            .iter_mut()
            .find(|m| m.id == message && m.channel == channel)
            .ok_or_else(|| BotError::platform(format!("Unknown Message {}", message)))?;
        target.reactions.push(emoji.to_string());
        Ok(())
    }

    async fn fetch_category(
        &self,
        guild: &GuildContext,
        category: Snowflake,
    ) -> Result<Option<ChannelGroup>> {
        let mut state = self.state.write().await;
        state.record(PlatformOperation::FetchCategory)?;
        let Some(parent) = state.channel(category) else {
            return Ok(None);
        };
        if parent.kind != ChannelKind::Category || parent.guild_id != guild.guild_id {
            return Ok(None);
        }

        let mut group = ChannelGroup::new(parent.id, parent.name.clone());
        group.channels = state
            .channels
            .iter()
            .filter(|c| c.parent == Some(category))
            .map(|c| GroupChannel {
                id: c.id,
                name: c.name.clone(),
                role: None,
            })
            .collect();
        Ok(Some(group))
    }

    async fn delete_channel(&self, channel: Snowflake) -> Result<()> {
        let mut state = self.state.write().await;
        state.record(PlatformOperation::DeleteChannel)?;
        let before = state.channels.len();
        state.channels.retain(|c| c.id != channel);
        if state.channels.len() == before {
            return Err(BotError::not_found(format!("channel {}", channel)));
        }
        // Discord leaves orphaned children at the top level
        for child in state.channels.iter_mut().filter(|c| c.parent == Some(channel)) {
            child.parent = None;
        }
        Ok(())
    }
}

// ============================================================================
// InMemoryEventCatalog - Serves pre-loaded event records
// ============================================================================

/// In-memory event catalog
#[derive(Debug, Default, Clone)]
pub struct InMemoryEventCatalog {
    events: Arc<RwLock<Vec<EventRecord>>>,
}

impl InMemoryEventCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with events
    pub async fn seed(&self, events: Vec<EventRecord>) {
        self.events.write().await.extend(events);
    }
}

#[async_trait]
impl EventCatalog for InMemoryEventCatalog {
    async fn fetch_by_id(&self, id: u64) -> Result<EventRecord> {
        self.events
            .read()
            .await
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| BotError::not_found(format!("event {}", id)))
    }

    async fn fetch_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<EventRecord>> {
        let events = self.events.read().await;
        let mut matched = Vec::new();
        for event in events.iter() {
            if matched.len() >= limit as usize {
                break;
            }
            let event_start = parse_event_timestamp(&event.start)?;
            let event_end = parse_event_timestamp(&event.finish)?;
            if event_start <= end && event_end >= start {
                matched.push(event.clone());
            }
        }
        Ok(matched)
    }
}
