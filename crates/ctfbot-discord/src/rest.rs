// Discord REST adapter
//
// Implements ChatPlatform with one REST call per method. Requests carry the
// bot token; responses are decoded into the wire types in `model`.

use async_trait::async_trait;
use reqwest::{header, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use ctfbot_core::{
    BotError, ChannelGroup, ChatPlatform, GroupChannel, GuildContext, Permission,
    PermissionOverride, Result, Snowflake,
};

use crate::model::{
    ApplicationCommand, Channel, CreateChannel, CreateMessage, Message, PermissionOverwrite,
    RegisteredCommand, ResponseData, GUILD_CATEGORY, GUILD_TEXT, OVERWRITE_ROLE, SEND_MESSAGES,
    VIEW_CHANNEL,
};

pub const DEFAULT_API_BASE_URL: &str = "https://discord.com/api/v10";

/// Sends per request, counting resends after a 429
pub const MAX_ATTEMPTS: u32 = 3;

/// Longest rate-limit wait the transport sits out
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("DiscordBot (ctfbot, ", env!("CARGO_PKG_VERSION"), ")");

/// Permission bitset for a list of permissions
pub fn permission_bits(permissions: &[Permission]) -> u64 {
    permissions.iter().fold(0, |bits, p| {
        bits | match p {
            Permission::ViewChannel => VIEW_CHANNEL,
            Permission::SendMessages => SEND_MESSAGES,
        }
    })
}

fn to_overwrite(o: &PermissionOverride) -> PermissionOverwrite {
    PermissionOverwrite {
        id: o.role_id.to_string(),
        kind: OVERWRITE_ROLE,
        allow: permission_bits(&o.allow).to_string(),
        deny: permission_bits(&o.deny).to_string(),
    }
}

/// Wait requested by a 429 response
///
/// Discord sends fractional seconds in the body's `retry_after`; the
/// `Retry-After` header is the fallback. Waits above `MAX_RETRY_AFTER` are
/// not honored.
pub fn retry_after(body: &str, header: Option<f64>) -> Option<Duration> {
    let seconds = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("retry_after").and_then(Value::as_f64))
        .or(header)?;
    if (0.0..=MAX_RETRY_AFTER.as_secs_f64()).contains(&seconds) {
        Some(Duration::from_secs_f64(seconds))
    } else {
        None
    }
}

fn to_body<T: serde::Serialize>(payload: &T) -> Result<Value> {
    serde_json::to_value(payload).map_err(|e| BotError::internal(e.to_string()))
}

/// Discord REST client bound to one bot token
#[derive(Clone)]
pub struct DiscordRest {
    base_url: Url,
    token: String,
    http: reqwest::Client,
}

impl std::fmt::Debug for DiscordRest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordRest")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .finish()
    }
}

impl DiscordRest {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(token, DEFAULT_API_BASE_URL)
    }

    pub fn with_base_url(token: impl Into<String>, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| BotError::config(format!("invalid Discord API URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(BotError::config(format!(
                "invalid Discord API URL '{}'",
                base_url
            )));
        }

        Ok(Self {
            base_url,
            token: token.into(),
            http: reqwest::Client::new(),
        })
    }

    /// Build an endpoint URL; every segment is percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BotError::config(format!("invalid Discord API URL '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// One REST call; a 429 is waited out and resent while attempts remain
    async fn call(&self, method: Method, segments: &[&str], body: Option<Value>) -> Result<String> {
        let url = self.endpoint(segments)?;
        let path = url.path().to_string();
        let mut attempt = 1;

        loop {
            debug!(method = %method, path = %path, attempt, "Discord request");

            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .header(header::AUTHORIZATION, format!("Bot {}", self.token))
                .header(header::USER_AGENT, USER_AGENT);
            request = match &body {
                Some(body) => request.json(body),
                None => request.header(header::CONTENT_LENGTH, 0),
            };

            let response = request
                .send()
                .await
                .map_err(|e| BotError::platform(format!("{} {} failed: {}", method, path, e)))?;

            let status = response.status();
            let retry_header = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<f64>().ok());
            let text = response
                .text()
                .await
                .map_err(|e| BotError::platform(format!("{} {} failed: {}", method, path, e)))?;

            if status == StatusCode::TOO_MANY_REQUESTS && attempt < MAX_ATTEMPTS {
                if let Some(wait) = retry_after(&text, retry_header) {
                    warn!(
                        method = %method,
                        path = %path,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        "Rate limited by Discord"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                    continue;
                }
            }

            if status == StatusCode::NOT_FOUND {
                return Err(BotError::not_found(format!("{} {}", method, path)));
            }
            if !status.is_success() {
                warn!(method = %method, path = %path, status = status.as_u16(), "Discord request rejected");
                return Err(BotError::platform(format!(
                    "{} {} returned {}: {}",
                    method, path, status, text
                )));
            }

            return Ok(text);
        }
    }

    async fn call_json<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Value>,
    ) -> Result<T> {
        let text = self.call(method, segments, body).await?;
        serde_json::from_str(&text)
            .map_err(|e| BotError::platform(format!("unexpected Discord response: {}", e)))
    }

    async fn create_guild_channel(
        &self,
        guild: &GuildContext,
        payload: CreateChannel<'_>,
    ) -> Result<Snowflake> {
        let guild_id = guild.guild_id.to_string();
        let channel: Channel = self
            .call_json(
                Method::POST,
                &["guilds", &guild_id, "channels"],
                Some(to_body(&payload)?),
            )
            .await?;
        Ok(channel.id)
    }

    /// All channels of a guild
    pub async fn guild_channels(&self, guild_id: Snowflake) -> Result<Vec<Channel>> {
        let guild_id = guild_id.to_string();
        self.call_json(Method::GET, &["guilds", &guild_id, "channels"], None)
            .await
    }

    /// Post a followup message for an interaction
    pub async fn create_followup(
        &self,
        application_id: Snowflake,
        interaction_token: &str,
        data: &ResponseData,
    ) -> Result<Snowflake> {
        let application_id = application_id.to_string();
        let message: Message = self
            .call_json(
                Method::POST,
                &["webhooks", &application_id, interaction_token],
                Some(to_body(data)?),
            )
            .await?;
        Ok(message.id)
    }

    /// Replace the application's commands (guild-scoped when `guild` is set)
    pub async fn register_commands(
        &self,
        application_id: Snowflake,
        guild: Option<Snowflake>,
        commands: &[ApplicationCommand],
    ) -> Result<Vec<RegisteredCommand>> {
        let application_id = application_id.to_string();
        let body = Some(to_body(&commands)?);
        match guild {
            Some(guild) => {
                let guild = guild.to_string();
                self.call_json(
                    Method::PUT,
                    &["applications", &application_id, "guilds", &guild, "commands"],
                    body,
                )
                .await
            }
            None => {
                self.call_json(Method::PUT, &["applications", &application_id, "commands"], body)
                    .await
            }
        }
    }
}

#[async_trait]
impl ChatPlatform for DiscordRest {
    async fn create_category(&self, guild: &GuildContext, name: &str) -> Result<Snowflake> {
        self.create_guild_channel(
            guild,
            CreateChannel {
                name,
                kind: GUILD_CATEGORY,
                parent_id: None,
                permission_overwrites: Vec::new(),
            },
        )
        .await
    }

    async fn create_text_channel(
        &self,
        guild: &GuildContext,
        category: Snowflake,
        name: &str,
        overrides: &[PermissionOverride],
    ) -> Result<Snowflake> {
        self.create_guild_channel(
            guild,
            CreateChannel {
                name,
                kind: GUILD_TEXT,
                parent_id: Some(category.to_string()),
                permission_overwrites: overrides.iter().map(to_overwrite).collect(),
            },
        )
        .await
    }

    async fn send_message(&self, channel: Snowflake, content: &str) -> Result<Snowflake> {
        let channel = channel.to_string();
        let message: Message = self
            .call_json(
                Method::POST,
                &["channels", &channel, "messages"],
                Some(to_body(&CreateMessage { content })?),
            )
            .await?;
        Ok(message.id)
    }

    async fn add_reaction(&self, channel: Snowflake, message: Snowflake, emoji: &str) -> Result<()> {
        let channel = channel.to_string();
        let message = message.to_string();
        self.call(
            Method::PUT,
            &["channels", &channel, "messages", &message, "reactions", emoji, "@me"],
            None,
        )
        .await?;
        Ok(())
    }

    async fn fetch_category(
        &self,
        guild: &GuildContext,
        category: Snowflake,
    ) -> Result<Option<ChannelGroup>> {
        let channels = self.guild_channels(guild.guild_id).await?;

        let Some(parent) = channels
            .iter()
            .find(|c| c.id == category && c.kind == GUILD_CATEGORY)
        else {
            return Ok(None);
        };

        let mut children: Vec<&Channel> = channels
            .iter()
            .filter(|c| c.parent_id == Some(category))
            .collect();
        children.sort_by_key(|c| c.position);

        let mut group = ChannelGroup::new(parent.id, parent.name.clone().unwrap_or_default());
        group.channels = children
            .into_iter()
            .map(|c| GroupChannel {
                id: c.id,
                name: c.name.clone().unwrap_or_default(),
                role: None,
            })
            .collect();
        Ok(Some(group))
    }

    async fn delete_channel(&self, channel: Snowflake) -> Result<()> {
        let channel = channel.to_string();
        self.call(Method::DELETE, &["channels", &channel], None)
            .await?;
        Ok(())
    }
}
