// Bot configuration loaded from environment variables.
// Decision: Required values fail startup with a Configuration error naming the variable
// Decision: DISCORD_TOKEN also accepts the legacy TOKEN name

use std::fmt;
use std::net::SocketAddr;

use ctfbot_core::{BotError, Result, Snowflake};
use ctfbot_ctftime::DEFAULT_BASE_URL as DEFAULT_CTFTIME_BASE_URL;
use ctfbot_discord::DEFAULT_API_BASE_URL;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:9000";

/// Complete bot configuration
#[derive(Clone)]
pub struct BotConfig {
    /// Bot token used for REST calls
    pub discord_token: String,
    pub application_id: Snowflake,
    /// Hex ed25519 key used to verify interaction requests
    pub public_key: String,
    /// Guild for command registration; global registration when unset
    pub guild_id: Option<Snowflake>,
    /// The single operator allowed to run workspace commands
    pub owner_id: u64,
    /// Identity mentioned in the flag-feedback seed message
    pub reset_identity: String,
    pub announcements_channel: Snowflake,
    /// Expose `delctfcategory`
    pub teardown_enabled: bool,
    pub ctftime_base_url: String,
    pub discord_api_base_url: String,
    pub bind_addr: SocketAddr,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("discord_token", &"<redacted>")
            .field("application_id", &self.application_id)
            .field("guild_id", &self.guild_id)
            .field("owner_id", &self.owner_id)
            .field("announcements_channel", &self.announcements_channel)
            .field("teardown_enabled", &self.teardown_enabled)
            .field("ctftime_base_url", &self.ctftime_base_url)
            .field("discord_api_base_url", &self.discord_api_base_url)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

impl BotConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup (tests use a map)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| {
            var(key).ok_or_else(|| BotError::config(format!("{} is not set", key)))
        };
        let snowflake = |key: &str, value: String| {
            value
                .parse::<Snowflake>()
                .map_err(|_| BotError::config(format!("{} must be a numeric id, got '{}'", key, value)))
        };

        let discord_token = var("DISCORD_TOKEN")
            .or_else(|| var("TOKEN"))
            .ok_or_else(|| BotError::config("DISCORD_TOKEN is not set"))?;

        let application_id = snowflake("DISCORD_APPLICATION_ID", required("DISCORD_APPLICATION_ID")?)?;
        let public_key = required("DISCORD_PUBLIC_KEY")?;
        let guild_id = var("DISCORD_GUILD_ID")
            .map(|v| snowflake("DISCORD_GUILD_ID", v))
            .transpose()?;

        let owner_id = snowflake("OWNER_ID", required("OWNER_ID")?)?.get();
        if owner_id == 0 {
            return Err(BotError::config("OWNER_ID must not be 0"));
        }

        let reset_identity = snowflake("RESET_LEADERBOARD_ID", required("RESET_LEADERBOARD_ID")?)?
            .to_string();
        let announcements_channel = snowflake(
            "ANNOUNCEMENTS_CHANNEL_ID",
            required("ANNOUNCEMENTS_CHANNEL_ID")?,
        )?;

        let teardown_enabled = match var("ENABLE_TEARDOWN") {
            Some(v) => parse_bool("ENABLE_TEARDOWN", &v)?,
            None => false,
        };

        let bind_addr = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse()
            .map_err(|_| BotError::config(format!("BIND_ADDR '{}' is not a socket address", bind_addr)))?;

        Ok(Self {
            discord_token,
            application_id,
            public_key,
            guild_id,
            owner_id,
            reset_identity,
            announcements_channel,
            teardown_enabled,
            ctftime_base_url: var("CTFTIME_BASE_URL")
                .unwrap_or_else(|| DEFAULT_CTFTIME_BASE_URL.to_string()),
            discord_api_base_url: var("DISCORD_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            bind_addr,
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(BotError::config(format!(
            "{} must be a boolean, got '{}'",
            key, value
        ))),
    }
}
