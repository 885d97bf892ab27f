// ctfbot Discord adapter
//
// Decision: Discord is reached over plain REST (v10) and the HTTP
//           interactions endpoint; no gateway connection is kept
// Decision: Discord ids travel as strings on the wire and as Snowflake inside
// Decision: Rendering of timestamps (`<t:..>`) happens here, not in core

pub mod commands;
pub mod markup;
pub mod model;
pub mod rest;
pub mod verify;

pub use commands::{command_definitions, CommandName};
pub use markup::{timestamp, user_mention};
pub use model::{
    ApplicationCommand, Channel, CommandData, CommandOption, Embed, EmbedField, Interaction,
    InteractionKind, InteractionResponse, RegisteredCommand, ResponseData, User, EPHEMERAL,
};
pub use rest::{DiscordRest, DEFAULT_API_BASE_URL};
pub use verify::{InteractionVerifier, VerifyError};
