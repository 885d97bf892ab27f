// `addctfchannels` and `delctfcategory`
//
// Both commands check the authorization policy before anything else and
// answer immediately. The workflow itself runs in the background and only
// reports back through a followup when there is something to say.

use futures::FutureExt;
use tracing::{error, info, warn};

use ctfbot_core::{
    Actor, AuthorizationPolicy, BotError, GuildContext, ProvisionOptions, Result, Snowflake,
    TeardownOutcome, WorkspaceSpec,
};
use ctfbot_discord::{CommandData, Interaction, InteractionResponse};

use super::{ephemeral, error_reply, text, user_message, CommandOutcome, DENIED_MESSAGE};
use crate::AppState;

pub const NOT_A_WORKSPACE_MESSAGE: &str = "this is not a CTF category!";

pub fn added_message(name: &str) -> String {
    format!("added new CTF category: {}", name)
}

pub fn deleted_message(name: &str) -> String {
    format!("Deleted CTF category: {}", name)
}

/// Guild the interaction came from; the @everyone role shares its id
fn guild_context(interaction: &Interaction) -> Result<GuildContext> {
    interaction
        .guild_id
        .map(|guild| GuildContext::new(guild, guild))
        .ok_or_else(|| BotError::invalid_argument("this command only works inside a server"))
}

fn command_data(interaction: &Interaction) -> Result<&CommandData> {
    interaction
        .data
        .as_ref()
        .ok_or_else(|| BotError::invalid_argument("missing command data"))
}

fn required<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| BotError::invalid_argument(format!("{} is required", name)))
}

fn denied(actor: &Actor, command: &str) -> CommandOutcome {
    warn!(actor_id = actor.id, command, "Command denied");
    CommandOutcome::reply(ephemeral(DENIED_MESSAGE))
}

struct AddRequest {
    spec: WorkspaceSpec,
    options: ProvisionOptions,
    guild: GuildContext,
}

impl AddRequest {
    fn parse(interaction: &Interaction) -> Result<Self> {
        let data = command_data(interaction)?;
        Ok(Self {
            spec: WorkspaceSpec::new(required(data.string("ctf_name"), "ctf_name")?),
            options: ProvisionOptions {
                seed_headers: required(data.boolean("headers"), "headers")?,
                announce: required(data.boolean("announce"), "announce")?,
            },
            guild: guild_context(interaction)?,
        })
    }
}

/// `addctfchannels`: acknowledge, then provision in the background
pub fn add(state: &AppState, interaction: &Interaction) -> CommandOutcome {
    let actor = interaction.actor();
    if !state.policy.authorize(&actor) {
        return denied(&actor, "addctfchannels");
    }

    let request = match AddRequest::parse(interaction) {
        Ok(request) => request,
        Err(e) => return CommandOutcome::reply(error_reply(&e)),
    };

    let ack = ephemeral(added_message(request.spec.name()));
    let state = state.clone();
    let application_id = interaction.application_id;
    let token = interaction.token.clone();

    let task = async move {
        let result = state
            .workspaces
            .provision(
                state.policy.as_ref(),
                &actor,
                &request.spec,
                request.options,
                &request.guild,
            )
            .await;

        match result {
            Ok(workspace) => info!(
                workspace = request.spec.name(),
                category_id = %workspace.group.id,
                "addctfchannels finished"
            ),
            Err(e) => {
                error!(workspace = request.spec.name(), error = %e, "addctfchannels failed");
                state
                    .notify(
                        application_id,
                        &token,
                        text(user_message(&e)).ephemeral(),
                    )
                    .await;
            }
        }
    };

    CommandOutcome::with_background(ack, task.boxed())
}

struct DeleteRequest {
    category: Snowflake,
    guild: GuildContext,
}

impl DeleteRequest {
    fn parse(interaction: &Interaction) -> Result<Self> {
        let data = command_data(interaction)?;
        Ok(Self {
            category: required(data.channel("category"), "category")?,
            guild: guild_context(interaction)?,
        })
    }
}

/// `delctfcategory`: defer, validate and delete in the background
pub fn delete(state: &AppState, interaction: &Interaction) -> CommandOutcome {
    let actor = interaction.actor();
    if !state.policy.authorize(&actor) {
        return denied(&actor, "delctfcategory");
    }

    let request = match DeleteRequest::parse(interaction) {
        Ok(request) => request,
        Err(e) => return CommandOutcome::reply(error_reply(&e)),
    };

    let state = state.clone();
    let application_id = interaction.application_id;
    let token = interaction.token.clone();

    let task = async move {
        let result = state
            .workspaces
            .teardown(
                state.policy.as_ref(),
                &actor,
                &request.guild,
                request.category,
            )
            .await;

        let message = match result {
            Ok(TeardownOutcome::Deleted { name, .. }) => deleted_message(&name),
            Ok(TeardownOutcome::Rejected { .. }) => NOT_A_WORKSPACE_MESSAGE.to_string(),
            Err(e) => {
                error!(category_id = %request.category, error = %e, "delctfcategory failed");
                user_message(&e)
            }
        };

        state
            .notify(application_id, &token, text(message).ephemeral())
            .await;
    };

    CommandOutcome::with_background(InteractionResponse::deferred(true), task.boxed())
}
