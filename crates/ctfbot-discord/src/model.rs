// Discord wire types
//
// Only the fields the bot reads or writes are modelled. Unknown fields are
// ignored on input.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use ctfbot_core::{Actor, Snowflake};

/// Message flag that hides a response from everyone but the invoker
pub const EPHEMERAL: u64 = 1 << 6;

/// Permission bit for viewing a channel
pub const VIEW_CHANNEL: u64 = 1 << 10;
/// Permission bit for sending messages
pub const SEND_MESSAGES: u64 = 1 << 11;

/// Channel type codes
pub const GUILD_TEXT: u8 = 0;
pub const GUILD_CATEGORY: u8 = 4;

/// Overwrite target codes
pub const OVERWRITE_ROLE: u8 = 0;

/// Serde helpers for ids that Discord sends as strings
pub mod id_string {
    use serde::{Deserialize, Deserializer, Serializer};

    use ctfbot_core::Snowflake;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    fn parse<E: serde::de::Error>(raw: Raw) -> Result<Snowflake, E> {
        match raw {
            Raw::Text(s) => s.parse().map_err(E::custom),
            Raw::Number(n) => Ok(Snowflake(n)),
        }
    }

    pub fn serialize<S: Serializer>(id: &Snowflake, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Snowflake, D::Error> {
        parse(Raw::deserialize(d)?)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(id: &Option<Snowflake>, s: S) -> Result<S::Ok, S::Error> {
            match id {
                Some(id) => s.collect_str(id),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<Snowflake>, D::Error> {
            Option::<Raw>::deserialize(d)?
                .map(parse::<D::Error>)
                .transpose()
        }
    }
}

// ============================================================================
// Interactions (inbound)
// ============================================================================

/// Interaction type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum InteractionKind {
    Ping,
    ApplicationCommand,
    MessageComponent,
    Autocomplete,
    ModalSubmit,
}

impl TryFrom<u8> for InteractionKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Ping),
            2 => Ok(Self::ApplicationCommand),
            3 => Ok(Self::MessageComponent),
            4 => Ok(Self::Autocomplete),
            5 => Ok(Self::ModalSubmit),
            other => Err(format!("unknown interaction type {}", other)),
        }
    }
}

impl From<InteractionKind> for u8 {
    fn from(kind: InteractionKind) -> Self {
        match kind {
            InteractionKind::Ping => 1,
            InteractionKind::ApplicationCommand => 2,
            InteractionKind::MessageComponent => 3,
            InteractionKind::Autocomplete => 4,
            InteractionKind::ModalSubmit => 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(with = "id_string")]
    pub id: Snowflake,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user: User,
}

/// An option value supplied by the invoker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandData {
    pub name: String,
    #[serde(default)]
    pub options: Vec<CommandOption>,
}

impl CommandData {
    fn value(&self, name: &str) -> Option<&Value> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.value.as_ref())
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(Value::as_str)
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.value(name).and_then(Value::as_bool)
    }

    /// NUMBER options may arrive as integers or floats
    pub fn number(&self, name: &str) -> Option<f64> {
        self.value(name).and_then(Value::as_f64)
    }

    /// CHANNEL options carry the channel id as a string
    pub fn channel(&self, name: &str) -> Option<Snowflake> {
        match self.value(name)? {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_u64().map(Snowflake),
            _ => None,
        }
    }
}

/// An incoming interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    #[serde(with = "id_string")]
    pub id: Snowflake,
    #[serde(with = "id_string")]
    pub application_id: Snowflake,
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    #[serde(default)]
    pub data: Option<CommandData>,
    #[serde(default, with = "id_string::option")]
    pub guild_id: Option<Snowflake>,
    #[serde(default, with = "id_string::option")]
    pub channel_id: Option<Snowflake>,
    /// Present for guild invocations
    #[serde(default)]
    pub member: Option<Member>,
    /// Present for DM invocations
    #[serde(default)]
    pub user: Option<User>,
    pub token: String,
}

impl Interaction {
    /// The invoking user, if Discord supplied one
    pub fn invoker(&self) -> Option<&User> {
        self.member.as_ref().map(|m| &m.user).or(self.user.as_ref())
    }

    /// The invoker as an authorization subject; absent users become id 0
    pub fn actor(&self) -> Actor {
        match self.invoker() {
            Some(user) => Actor::new(user.id.get()).with_name(user.username.clone()),
            None => Actor::new(0),
        }
    }
}

// ============================================================================
// Responses (outbound)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedThumbnail {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedThumbnail>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

impl Embed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(EmbedThumbnail { url: url.into() });
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    /// Zero-width inline field that pads a row of three
    pub fn spacer(self) -> Self {
        self.field("\u{200b}", "\u{200b}", true)
    }
}

/// Message body used by interaction responses and followups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

impl ResponseData {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            embeds: vec![embed],
            ..Self::default()
        }
    }

    pub fn embeds(embeds: Vec<Embed>) -> Self {
        Self {
            embeds,
            ..Self::default()
        }
    }

    pub fn ephemeral(mut self) -> Self {
        self.flags = Some(self.flags.unwrap_or(0) | EPHEMERAL);
        self
    }

    pub fn is_ephemeral(&self) -> bool {
        self.flags.unwrap_or(0) & EPHEMERAL != 0
    }
}

/// Response to an interaction request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl InteractionResponse {
    pub const PONG: u8 = 1;
    pub const CHANNEL_MESSAGE: u8 = 4;
    pub const DEFERRED_CHANNEL_MESSAGE: u8 = 5;

    pub fn pong() -> Self {
        Self {
            kind: Self::PONG,
            data: None,
        }
    }

    pub fn message(data: ResponseData) -> Self {
        Self {
            kind: Self::CHANNEL_MESSAGE,
            data: Some(data),
        }
    }

    /// "Bot is thinking..." placeholder, completed by a followup
    pub fn deferred(ephemeral: bool) -> Self {
        let data = ephemeral.then(|| ResponseData::default().ephemeral());
        Self {
            kind: Self::DEFERRED_CHANNEL_MESSAGE,
            data,
        }
    }
}

// ============================================================================
// Channels and messages (REST)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverwrite {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    pub allow: String,
    pub deny: String,
}

/// Body of `POST /guilds/{guild}/channels`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateChannel<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub permission_overwrites: Vec<PermissionOverwrite>,
}

/// A guild channel as returned by the REST API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Channel {
    #[serde(with = "id_string")]
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, with = "id_string::option")]
    pub parent_id: Option<Snowflake>,
    #[serde(default)]
    pub position: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateMessage<'a> {
    pub content: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    #[serde(with = "id_string")]
    pub id: Snowflake,
}

// ============================================================================
// Application commands
// ============================================================================

/// Option type codes used by the bot's commands
pub mod option_type {
    pub const STRING: u8 = 3;
    pub const BOOLEAN: u8 = 5;
    pub const CHANNEL: u8 = 7;
    pub const NUMBER: u8 = 10;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOptionDefinition {
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: String,
    pub description: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channel_types: Vec<u8>,
}

/// A slash command definition as registered with Discord
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationCommand {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOptionDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisteredCommand {
    #[serde(with = "id_string")]
    pub id: Snowflake,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn command_interaction() -> Value {
        json!({
            "id": "1100000000000000001",
            "application_id": "1100000000000000002",
            "type": 2,
            "token": "tok",
            "guild_id": "1100000000000000003",
            "member": {
                "user": {"id": "42", "username": "operator", "global_name": null},
                "roles": []
            },
            "data": {
                "id": "9",
                "name": "addctfchannels",
                "type": 1,
                "options": [
                    {"name": "ctf_name", "type": 3, "value": "ExampleCTF"},
                    {"name": "headers", "type": 5, "value": true},
                    {"name": "announce", "type": 5, "value": false}
                ]
            }
        })
    }

    #[test]
    fn test_decode_command_interaction() {
        let interaction: Interaction = serde_json::from_value(command_interaction()).unwrap();
        assert_eq!(interaction.kind, InteractionKind::ApplicationCommand);
        assert_eq!(interaction.guild_id, Some(Snowflake(1100000000000000003)));
        assert_eq!(interaction.actor().id, 42);

        let data = interaction.data.unwrap();
        assert_eq!(data.name, "addctfchannels");
        assert_eq!(data.string("ctf_name"), Some("ExampleCTF"));
        assert_eq!(data.boolean("headers"), Some(true));
        assert_eq!(data.boolean("announce"), Some(false));
        assert_eq!(data.boolean("missing"), None);
    }

    #[test]
    fn test_decode_ping() {
        let interaction: Interaction = serde_json::from_value(json!({
            "id": "1", "application_id": "2", "type": 1, "token": "t"
        }))
        .unwrap();
        assert_eq!(interaction.kind, InteractionKind::Ping);
        assert!(interaction.data.is_none());
        assert_eq!(interaction.actor().id, 0);
    }

    #[test]
    fn test_unknown_interaction_type_fails() {
        let result = serde_json::from_value::<Interaction>(json!({
            "id": "1", "application_id": "2", "type": 99, "token": "t"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_number_and_channel_options() {
        let data: CommandData = serde_json::from_value(json!({
            "name": "x",
            "options": [
                {"name": "eventid", "type": 10, "value": 2000.4},
                {"name": "category", "type": 7, "value": "555"}
            ]
        }))
        .unwrap();
        assert_eq!(data.number("eventid"), Some(2000.4));
        assert_eq!(data.channel("category"), Some(Snowflake(555)));
    }

    #[test]
    fn test_ephemeral_flag() {
        let data = ResponseData::text("hi").ephemeral();
        assert!(data.is_ephemeral());
        let json = serde_json::to_value(InteractionResponse::message(data)).unwrap();
        assert_eq!(json["type"], 4);
        assert_eq!(json["data"]["flags"], 64);
        assert_eq!(json["data"]["content"], "hi");
        assert!(json["data"].get("embeds").is_none());
    }

    #[test]
    fn test_ids_serialize_as_strings() {
        let user = User {
            id: Snowflake(1234),
            username: "u".into(),
            global_name: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], "1234");
    }

    #[test]
    fn test_pong_has_no_data() {
        let json = serde_json::to_value(InteractionResponse::pong()).unwrap();
        assert_eq!(json, json!({"type": 1}));
    }
}
