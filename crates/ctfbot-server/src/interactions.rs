// Interactions endpoint
//
// Every request is signature-checked before its body is parsed. PINGs are
// answered inline; application commands go to the command dispatcher and any
// background work it returns is spawned after the response is built.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, warn};

use ctfbot_discord::verify::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use ctfbot_discord::{Interaction, InteractionKind, InteractionResponse};

use crate::commands;
use crate::{AppState, ErrorResponse};

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

pub async fn handle_interaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let (Some(signature), Some(timestamp)) = (header(SIGNATURE_HEADER), header(TIMESTAMP_HEADER))
    else {
        return reject(StatusCode::UNAUTHORIZED, "missing request signature");
    };

    if let Err(e) = state.verifier.verify(signature, timestamp, &body) {
        warn!(error = %e, "Rejected interaction");
        return reject(StatusCode::UNAUTHORIZED, "invalid request signature");
    }

    let interaction: Interaction = match serde_json::from_slice(&body) {
        Ok(interaction) => interaction,
        Err(e) => {
            warn!(error = %e, "Undecodable interaction");
            return reject(StatusCode::BAD_REQUEST, "malformed interaction");
        }
    };

    match interaction.kind {
        InteractionKind::Ping => {
            debug!("PING");
            Json(InteractionResponse::pong()).into_response()
        }
        InteractionKind::ApplicationCommand => {
            let outcome = commands::dispatch(&state, interaction).await;
            if let Some(task) = outcome.background {
                tokio::spawn(task);
            }
            Json(outcome.response).into_response()
        }
        other => {
            debug!(kind = ?other, "Ignoring unsupported interaction");
            reject(StatusCode::BAD_REQUEST, "unsupported interaction type")
        }
    }
}
