//! Concierge API server binary.
//!
//! Usage:
//!   concierge                              # serve on 127.0.0.1:8080
//!   concierge serve --port 8080 --bind 0.0.0.0
//!   concierge --config concierge.toml serve
//!   concierge chat --agent greeter
//!
//! # Environment Variables
//!
//! - `OPENAI_API_KEY` - Enables model-generated replies (simulated otherwise)
//! - `OPENAI_BASE_URL` - OpenAI-compatible endpoint (default: https://api.openai.com)
//! - `APP_PORT` - Port to listen on (default: 8080)
//! - `CONCIERGE_BIND_ADDR` - Bind address (default: 127.0.0.1)
//!
//! Variables may also be placed in a `.env` file in the working directory.

use clap::Parser;
use concierge_api::cli::{Cli, Command};
use concierge_api::{AppState, ConciergeConfig, chat, serve};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command();
    let dotenv_result = dotenv::dotenv();

    let default_filter = match command {
        Command::Serve { .. } => "info,concierge_api=debug,tower_http=debug",
        Command::Chat { .. } => "warn",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = dotenv_result {
        if !e.not_found() {
            tracing::warn!(error = %e, "Failed to load .env file");
        }
    }

    let config = match cli.config {
        Some(ref path) => {
            tracing::info!(path = %path.display(), "Loading configuration");
            ConciergeConfig::from_file(path)?
        }
        None => {
            tracing::debug!("Using default configuration");
            ConciergeConfig::default()
        }
    };
    let mut config = config.with_env()?;

    match command {
        Command::Serve { port, bind } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(bind) = bind {
                config.server.bind = bind;
            }

            if config.server.bind == "0.0.0.0" {
                tracing::warn!(
                    "Server binding to 0.0.0.0, which exposes the API on all network interfaces."
                );
            }

            let state = AppState::from_llm_config(&config.llm)?
                .with_body_limit(config.server.max_body_bytes);
            serve(Arc::new(state), config.socket_addr()?).await?;
        }

        Command::Chat { agent } => {
            let state = AppState::from_llm_config(&config.llm)?;
            let Some(agent) = state.registry.lookup(&agent) else {
                anyhow::bail!(
                    "Agent '{}' not found. Available agents: {}",
                    agent,
                    state.registry.names().join(", ")
                );
            };

            let mut stdout = tokio::io::stdout();
            chat::run_chat(agent, BufReader::new(tokio::io::stdin()), &mut stdout).await?;
        }
    }

    Ok(())
}
