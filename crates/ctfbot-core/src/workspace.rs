// Workspace domain types
//
// WorkspaceSpec describes what should exist; ChannelGroup describes what the
// platform actually holds. The topology is the same for every workspace, only
// the name varies.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::Snowflake;

/// The fixed channel roles of a CTF workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelRole {
    FlagFeedback,
    General,
    Web,
    Crypto,
    Pwn,
    Rev,
    Forensics,
    Misc,
}

impl ChannelRole {
    /// Channel creation order
    pub const TOPOLOGY: [ChannelRole; 8] = [
        ChannelRole::FlagFeedback,
        ChannelRole::General,
        ChannelRole::Web,
        ChannelRole::Crypto,
        ChannelRole::Pwn,
        ChannelRole::Rev,
        ChannelRole::Forensics,
        ChannelRole::Misc,
    ];

    /// Name the channel is created with
    pub fn channel_name(&self) -> &'static str {
        match self {
            ChannelRole::FlagFeedback => "flag-feedback",
            ChannelRole::General => "general",
            ChannelRole::Web => "web",
            ChannelRole::Crypto => "crypto",
            ChannelRole::Pwn => "pwn",
            ChannelRole::Rev => "rev",
            ChannelRole::Forensics => "forensics",
            ChannelRole::Misc => "misc",
        }
    }

    /// Only flag-feedback is read-only for ordinary members
    pub fn is_read_only(&self) -> bool {
        matches!(self, ChannelRole::FlagFeedback)
    }

    pub fn from_channel_name(name: &str) -> Option<Self> {
        Self::TOPOLOGY
            .into_iter()
            .find(|role| role.channel_name() == name)
    }
}

impl fmt::Display for ChannelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.channel_name())
    }
}

/// Desired shape of a provisioned workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceSpec {
    name: String,
}

impl WorkspaceSpec {
    /// The name is used verbatim; it is not checked for emptiness or uniqueness.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn topology(&self) -> &'static [ChannelRole] {
        &ChannelRole::TOPOLOGY
    }
}

/// Optional provisioning stages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionOptions {
    /// Post a seed message into every new channel
    pub seed_headers: bool,
    /// Announce the workspace in the announcements channel
    pub announce: bool,
}

/// Guild the workflow operates in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildContext {
    pub guild_id: Snowflake,
    /// Role every member holds (the subject of the read-only override)
    pub default_role_id: Snowflake,
}

impl GuildContext {
    pub fn new(guild_id: Snowflake, default_role_id: Snowflake) -> Self {
        Self {
            guild_id,
            default_role_id,
        }
    }
}

/// Channel permission bits used by overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewChannel,
    SendMessages,
}

/// Per-channel permission override for a role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverride {
    pub role_id: Snowflake,
    pub allow: Vec<Permission>,
    pub deny: Vec<Permission>,
}

impl PermissionOverride {
    /// Members can read but not post
    pub fn read_only(role_id: Snowflake) -> Self {
        Self {
            role_id,
            allow: vec![Permission::ViewChannel],
            deny: vec![Permission::SendMessages],
        }
    }
}

/// A channel inside a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupChannel {
    pub id: Snowflake,
    pub name: String,
    /// Role the channel was created for; None for snapshots read back from the platform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ChannelRole>,
}

/// A category and its child channels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelGroup {
    pub id: Snowflake,
    pub name: String,
    pub channels: Vec<GroupChannel>,
}

impl ChannelGroup {
    pub fn new(id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            channels: Vec::new(),
        }
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.name.as_str())
    }

    /// Channel created for a role
    pub fn channel_for(&self, role: ChannelRole) -> Option<&GroupChannel> {
        self.channels.iter().find(|c| c.role == Some(role))
    }
}
