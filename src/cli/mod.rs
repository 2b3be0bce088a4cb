pub mod commands;
pub mod utils;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::client::{FactsClient, LocalIdentityProvider, SessionController};

#[derive(Parser)]
#[command(name = "facts")]
#[command(about = "Facts CLI - save and list your facts from the command line")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        env = "FACTS_API_URL",
        default_value = "http://localhost:3000",
        help = "Base URL of the facts API"
    )]
    pub api_url: String,

    #[arg(long, global = true, env = "FACTS_TOKEN", hide_env_values = true, help = "Bearer token to sign in with")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Developer tokens and identity")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "List, add and generate facts")]
    Data {
        #[command(subcommand)]
        cmd: commands::data::DataCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Connection settings shared by the data commands
pub struct CliContext {
    pub output_format: OutputFormat,
    pub api_url: String,
    pub token: Option<String>,
}

impl CliContext {
    /// Build a session controller and sign in with the configured token
    pub async fn signed_in_controller(&self) -> anyhow::Result<SessionController> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("No token provided; pass --token or set FACTS_TOKEN"))?;

        let identity = Arc::new(LocalIdentityProvider::new());
        let api = Arc::new(FactsClient::new(&self.api_url)?);
        let controller = SessionController::new(identity, api);

        controller.sign_in(token).await?;
        controller.settled().await;
        Ok(controller)
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = CliContext {
        output_format: OutputFormat::from_cli(&cli),
        api_url: cli.api_url,
        token: cli.token,
    };

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &ctx).await,
        Commands::Data { cmd } => commands::data::handle(cmd, &ctx).await,
    }
}
