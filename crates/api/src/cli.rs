//! Command-line interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "concierge",
    version,
    about = "HTTP gateway that routes queries to greeter, task_executor and coordinator agents"
)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API (default)
    Serve {
        /// Port to listen on [env: APP_PORT, default: 8080]
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind [env: CONCIERGE_BIND_ADDR, default: 127.0.0.1]
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Chat with an agent in the terminal
    Chat {
        /// Agent to talk to
        #[arg(short, long, default_value = crate::routes::DEFAULT_AGENT)]
        agent: String,
    },
}

impl Cli {
    /// The subcommand to run, `serve` when none was given.
    pub fn command(&self) -> Command {
        match &self.command {
            Some(Command::Serve { port, bind }) => Command::Serve {
                port: *port,
                bind: bind.clone(),
            },
            Some(Command::Chat { agent }) => Command::Chat {
                agent: agent.clone(),
            },
            None => Command::Serve {
                port: None,
                bind: None,
            },
        }
    }
}
