pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "parc")]
#[command(about = "Parc CLI - route guard and session checks for the parc informatique dashboard")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Backend base URL (overrides the saved selection)")]
    pub api_url: Option<String>,

    #[arg(long, global = true, env = "PARC_SESSION_TOKEN", hide_env_values = true, help = "Session cookie value (overrides the saved cookie)")]
    pub session: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Evaluate the edge route guard")]
    Guard {
        #[command(subcommand)]
        cmd: commands::guard::GuardCommands,
    },

    #[command(about = "Session bootstrap, identity and logout")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Backend selection and health")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
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

/// Backend URL and cookie after applying flags over the saved selection
#[derive(Debug, Clone)]
pub struct Target {
    pub api_url: String,
    pub cookie: Option<String>,
}

impl Target {
    pub fn resolve(
        api_url: Option<String>,
        session: Option<String>,
        saved: &config::EnvironmentConfig,
    ) -> Self {
        Self {
            api_url: api_url
                .or_else(|| saved.api_url.clone())
                .unwrap_or_else(|| crate::config::config().api.base_url.clone()),
            cookie: session.or_else(|| saved.cookie.clone()).filter(|c| !c.is_empty()),
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let saved = config::load_environment_config()?;
    let target = Target::resolve(cli.api_url, cli.session, &saved);

    match cli.command {
        Commands::Guard { cmd } => commands::guard::handle(cmd, output_format).await,
        Commands::Auth { cmd } => commands::auth::handle(cmd, &target, output_format).await,
        Commands::Server { cmd } => commands::server::handle(cmd, &target, output_format).await,
    }
}
