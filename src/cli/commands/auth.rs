use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{load_environment_config, save_environment_config};
use crate::cli::utils::{output_fields, output_success};
use crate::cli::{OutputFormat, Target};
use crate::session::{HttpIdentityApi, SessionContext, SessionState};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Bootstrap a session and show its state")]
    Status,

    #[command(about = "Show current user information")]
    Whoami,

    #[command(about = "Logout from the backend and forget the saved cookie")]
    Logout,

    #[command(about = "Save the session cookie value to use for later commands")]
    Cookie {
        #[arg(help = "Opaque value of the Authentication cookie")]
        token: String,
    },

    #[command(about = "Forget the saved session cookie")]
    Forget,
}

pub async fn handle(cmd: AuthCommands, target: &Target, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Status => status(target, &output_format).await,
        AuthCommands::Whoami => whoami(target, &output_format).await,
        AuthCommands::Logout => logout(target, &output_format).await,
        AuthCommands::Cookie { token } => {
            let mut env = load_environment_config()?;
            env.set_cookie(token);
            save_environment_config(&env)?;
            output_success(&output_format, "Session cookie saved", None)
        }
        AuthCommands::Forget => {
            forget_cookie()?;
            output_success(&output_format, "Session cookie forgotten", None)
        }
    }
}

fn session(target: &Target) -> anyhow::Result<SessionContext<HttpIdentityApi>> {
    let config = crate::config::config();
    let api = HttpIdentityApi::new(&target.api_url, &config.session.cookie_name, target.cookie.clone())?;
    Ok(SessionContext::new(api)
        .with_timeout(config.request_timeout())
        .with_login_path(&config.routes.login_path))
}

fn forget_cookie() -> anyhow::Result<()> {
    let mut env = load_environment_config()?;
    env.clear_cookie();
    save_environment_config(&env)
}

async fn status(target: &Target, output_format: &OutputFormat) -> anyhow::Result<()> {
    let mut ctx = session(target)?;
    let reason = ctx.bootstrap().await.err().map(|e| e.to_string());

    let state = match ctx.state() {
        SessionState::Authenticated(_) => "authenticated",
        SessionState::Anonymous => "anonymous",
        SessionState::Uninitialized | SessionState::Loading => "pending",
    };

    output_fields(
        output_format,
        &[
            ("backend", json!(target.api_url)),
            ("state", json!(state)),
            ("user", json!(ctx.identity().map(|i| i.display_name()))),
            ("role", json!(ctx.identity().map(|i| i.roles.as_str()))),
            ("gate", json!(ctx.gate().name())),
            ("reason", json!(reason)),
        ],
    )
}

async fn whoami(target: &Target, output_format: &OutputFormat) -> anyhow::Result<()> {
    let mut ctx = session(target)?;
    ctx.bootstrap().await?;

    let identity = ctx
        .identity()
        .ok_or_else(|| anyhow::anyhow!("Not logged in"))?;

    output_fields(
        output_format,
        &[
            ("sub", json!(identity.sub)),
            ("email", json!(identity.email)),
            ("roles", json!(identity.roles)),
            ("name", json!(identity.display_name())),
            ("issued_at", json!(identity.issued_at().map(|t| t.to_rfc3339()))),
            ("expires_at", json!(identity.expires_at().map(|t| t.to_rfc3339()))),
        ],
    )
}

async fn logout(target: &Target, output_format: &OutputFormat) -> anyhow::Result<()> {
    let mut ctx = session(target)?;
    let outcome = ctx.logout().await;
    forget_cookie()?;

    let message = match &outcome.remote {
        Ok(()) => "Logged out".to_string(),
        Err(e) => format!("Logged out locally (backend: {})", e),
    };

    output_success(
        output_format,
        &message,
        Some(json!({
            "redirect_to": outcome.redirect_to,
            "backend_confirmed": outcome.remote.is_ok(),
        })),
    )
}
