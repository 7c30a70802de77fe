use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{load_environment_config, ping_backend, save_environment_config};
use crate::cli::utils::{output_fields, output_success};
use crate::cli::{OutputFormat, Target};

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Select the backend base URL for later commands")]
    Use {
        #[arg(help = "Backend base URL, e.g. http://localhost:8000")]
        url: String,
    },

    #[command(about = "Show the backend that commands will talk to")]
    Current,

    #[command(about = "Check that the backend answers")]
    Ping,
}

pub async fn handle(cmd: ServerCommands, target: &Target, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Use { url } => {
            let parsed = url::Url::parse(&url).map_err(|e| anyhow::anyhow!("Invalid URL '{}': {}", url, e))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                anyhow::bail!("Backend URL must use http or https: {}", url);
            }

            let mut env = load_environment_config()?;
            env.set_api_url(url.clone());
            save_environment_config(&env)?;

            output_success(
                &output_format,
                &format!("Switched to backend '{}'", url),
                Some(json!({ "api_url": url })),
            )
        }
        ServerCommands::Current => output_fields(
            &output_format,
            &[
                ("api_url", json!(target.api_url)),
                ("cookie", json!(target.cookie.is_some())),
            ],
        ),
        ServerCommands::Ping => {
            let config = crate::config::config();
            let client = reqwest::Client::new();
            let status = ping_backend(&client, &target.api_url, config.health_timeout()).await;

            output_fields(
                &output_format,
                &[("api_url", json!(target.api_url)), ("status", json!(status))],
            )
        }
    }
}
