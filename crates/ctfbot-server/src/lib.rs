// ctfbot interactions server
//
// Decision: One axum router serves /interactions and /health
// Decision: Shared state holds trait objects so tests swap in memory backends

pub mod commands;
pub mod config;
pub mod followup;
pub mod interactions;
pub mod telemetry;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::error;

use ctfbot_core::{
    AuthorizationPolicy, BotError, ChatPlatform, EventCatalog, ProvisionSettings, Result,
    SingleOperatorPolicy, Snowflake, WorkspaceService,
};
use ctfbot_ctftime::CtftimeClient;
use ctfbot_discord::{DiscordRest, InteractionVerifier, ResponseData};

use crate::config::BotConfig;
use crate::followup::FollowupSink;

/// App state shared across routes
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn EventCatalog>,
    pub workspaces: Arc<WorkspaceService>,
    pub policy: Arc<dyn AuthorizationPolicy>,
    pub followups: Arc<dyn FollowupSink>,
    pub verifier: Arc<InteractionVerifier>,
    /// Serve `delctfcategory`
    pub teardown_enabled: bool,
}

impl AppState {
    /// Production wiring: CTFtime catalog, Discord REST platform and followups
    pub fn from_config(config: &BotConfig) -> Result<Self> {
        let discord = Arc::new(DiscordRest::with_base_url(
            config.discord_token.clone(),
            &config.discord_api_base_url,
        )?);
        let verifier = InteractionVerifier::from_hex(&config.public_key)
            .map_err(|e| BotError::config(format!("DISCORD_PUBLIC_KEY: {}", e)))?;

        let platform: Arc<dyn ChatPlatform> = discord.clone();
        let workspaces = WorkspaceService::new(
            platform,
            ProvisionSettings {
                reset_identity: config.reset_identity.clone(),
                announcements_channel: config.announcements_channel,
            },
        );

        Ok(Self {
            catalog: Arc::new(CtftimeClient::with_base_url(&config.ctftime_base_url)),
            workspaces: Arc::new(workspaces),
            policy: Arc::new(SingleOperatorPolicy::new(config.owner_id)),
            followups: discord,
            verifier: Arc::new(verifier),
            teardown_enabled: config.teardown_enabled,
        })
    }

    /// Deliver a followup; failures are logged, there is nobody left to tell
    pub async fn notify(&self, application_id: Snowflake, token: &str, data: ResponseData) {
        if let Err(e) = self
            .followups
            .send_followup(application_id, token, data)
            .await
        {
            error!(error = %e, "Failed to deliver followup");
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Standard error body for rejected HTTP requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Build the HTTP router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/interactions", post(interactions::handle_interaction))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
