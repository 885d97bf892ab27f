// Slash command handlers
//
// A handler returns the immediate interaction response and, for anything
// that waits on CTFtime or touches many channels, a background future the
// router spawns. Discord discards responses sent after three seconds, so the
// future reports through a followup message instead.

pub mod event_info;
pub mod upcoming;
pub mod workspace;

use std::future::Future;

use chrono::Utc;
use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{info, warn};

use ctfbot_core::{BotError, Result};
use ctfbot_discord::{CommandName, Embed, Interaction, InteractionResponse, ResponseData};

use crate::AppState;

/// Shown to anyone the authorization policy rejects
pub const DENIED_MESSAGE: &str = "you are not allowed to run this command!";

/// Discord's limit on message content
pub const CONTENT_LIMIT: usize = 2000;

/// Response plus optional work to run after it is sent
pub struct CommandOutcome {
    pub response: InteractionResponse,
    pub background: Option<BoxFuture<'static, ()>>,
}

impl CommandOutcome {
    pub fn reply(response: InteractionResponse) -> Self {
        Self {
            response,
            background: None,
        }
    }

    pub fn with_background(response: InteractionResponse, task: BoxFuture<'static, ()>) -> Self {
        Self {
            response,
            background: Some(task),
        }
    }
}

/// Plain-text message body, cut to `CONTENT_LIMIT`
pub fn text(content: impl Into<String>) -> ResponseData {
    ResponseData::text(truncate(&content.into(), CONTENT_LIMIT))
}

/// Ephemeral plain-text reply
pub fn ephemeral(content: impl Into<String>) -> InteractionResponse {
    InteractionResponse::message(text(content).ephemeral())
}

/// Text shown to the invoker for a failed command
pub fn user_message(err: &BotError) -> String {
    match err {
        BotError::Unauthorized { .. } => DENIED_MESSAGE.to_string(),
        other => other.to_string(),
    }
}

pub fn error_reply(err: &BotError) -> InteractionResponse {
    ephemeral(user_message(err))
}

/// Cut `text` to at most `max` characters
pub(crate) fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Defer publicly, then post the lookup's embeds (or its error) as a followup
fn deferred_lookup<F>(
    state: &AppState,
    interaction: &Interaction,
    command: CommandName,
    lookup: F,
) -> CommandOutcome
where
    F: Future<Output = Result<Vec<Embed>>> + Send + 'static,
{
    let state = state.clone();
    let application_id = interaction.application_id;
    let token = interaction.token.clone();

    let task = async move {
        let data = match lookup.await {
            Ok(embeds) => ResponseData::embeds(embeds),
            Err(e) => {
                warn!(command = %command, error = %e, "Lookup failed");
                text(user_message(&e))
            }
        };
        state.notify(application_id, &token, data).await;
    };

    CommandOutcome::with_background(InteractionResponse::deferred(false), task.boxed())
}

/// Route an application command to its handler
pub async fn dispatch(state: &AppState, interaction: Interaction) -> CommandOutcome {
    let Some(data) = interaction.data.as_ref() else {
        return CommandOutcome::reply(ephemeral("missing command data"));
    };

    let command = match data.name.parse::<CommandName>() {
        Ok(command) => command,
        Err(e) => {
            warn!(command = %data.name, "Unknown command");
            return CommandOutcome::reply(ephemeral(e));
        }
    };

    info!(
        command = %command,
        actor_id = interaction.actor().id,
        guild_id = ?interaction.guild_id,
        "Handling command"
    );

    match command {
        CommandName::EventInfo => {
            let catalog = state.catalog.clone();
            let data = data.clone();
            deferred_lookup(state, &interaction, command, async move {
                event_info::run(catalog.as_ref(), &data)
                    .await
                    .map(|embed| vec![embed])
            })
        }
        CommandName::Upcoming => {
            let catalog = state.catalog.clone();
            deferred_lookup(state, &interaction, command, async move {
                upcoming::run(catalog.as_ref(), Utc::now()).await
            })
        }
        CommandName::AddWorkspace => workspace::add(state, &interaction),
        CommandName::DeleteWorkspace if state.teardown_enabled => {
            workspace::delete(state, &interaction)
        }
        CommandName::DeleteWorkspace => {
            CommandOutcome::reply(ephemeral("category deletion is disabled"))
        }
    }
}
