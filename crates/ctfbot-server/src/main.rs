// ctfbot
//
// Design Decision: Use clap derive for the two entry points (serve, register-commands)
// Design Decision: `serve` is the default when no subcommand is given

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use ctfbot_discord::{command_definitions, DiscordRest};
use ctfbot_server::config::BotConfig;
use ctfbot_server::telemetry::{init_telemetry, TelemetryConfig};
use ctfbot_server::{router, AppState};

#[derive(Parser)]
#[command(name = "ctfbot")]
#[command(about = "Discord bot for CTF teams: CTFtime lookups and per-CTF channel workspaces")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the interactions endpoint
    Serve,

    /// Register slash commands with Discord
    RegisterCommands {
        /// Register globally even when DISCORD_GUILD_ID is set
        #[arg(long)]
        global: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the environment may already be populated
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut telemetry_config = TelemetryConfig::from_env();
    telemetry_config.service_version = Some(env!("CARGO_PKG_VERSION").to_string());
    init_telemetry(telemetry_config);

    let config = BotConfig::from_env().context("Failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::RegisterCommands { global } => register_commands(config, global).await,
    }
}

async fn serve(config: BotConfig) -> Result<()> {
    tracing::info!(
        application_id = %config.application_id,
        owner_id = config.owner_id,
        teardown_enabled = config.teardown_enabled,
        "ctfbot starting..."
    );

    let state = AppState::from_config(&config).context("Failed to initialize bot state")?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("HTTP server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Received shutdown signal");
        })
        .await
        .context("Server error")?;

    tracing::info!("ctfbot stopped");
    Ok(())
}

async fn register_commands(config: BotConfig, global: bool) -> Result<()> {
    let rest = DiscordRest::with_base_url(config.discord_token.clone(), &config.discord_api_base_url)
        .context("Failed to create Discord client")?;

    let guild = if global { None } else { config.guild_id };
    let commands = command_definitions(config.teardown_enabled);

    let registered = rest
        .register_commands(config.application_id, guild, &commands)
        .await
        .context("Failed to register commands")?;

    match guild {
        Some(guild) => tracing::info!(guild_id = %guild, count = registered.len(), "Registered guild commands"),
        None => tracing::info!(count = registered.len(), "Registered global commands"),
    }
    for command in &registered {
        println!("{}\t{}", command.id, command.name);
    }

    Ok(())
}
