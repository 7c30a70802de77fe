use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_fields, output_list};
use crate::cli::OutputFormat;
use crate::guard::{Decision, RouteGuard};

#[derive(Subcommand)]
pub enum GuardCommands {
    #[command(about = "Show what the route guard does with a request path")]
    Check {
        #[arg(help = "Request path, e.g. /bureaux/12")]
        path: String,
        #[arg(long, help = "Pretend the session cookie is present")]
        cookie: bool,
    },

    #[command(about = "List protected patterns and public paths")]
    Routes,
}

pub async fn handle(cmd: GuardCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let guard = crate::config::config().route_guard()?;

    match cmd {
        GuardCommands::Check { path, cookie } => check(&guard, &path, cookie, &output_format),
        GuardCommands::Routes => routes(&guard, &output_format),
    }
}

fn check(guard: &RouteGuard, path: &str, cookie: bool, output_format: &OutputFormat) -> anyhow::Result<()> {
    let decision = guard.decide(path, cookie);
    let label = match &decision {
        Decision::Continue => "continue",
        Decision::RedirectToLogin(_) => "redirect to login",
        Decision::RedirectToHome(_) => "redirect to home",
    };

    output_fields(
        output_format,
        &[
            ("path", json!(path)),
            ("cookie", json!(cookie)),
            ("decision", json!(label)),
            ("location", json!(decision.location())),
        ],
    )
}

fn routes(guard: &RouteGuard, output_format: &OutputFormat) -> anyhow::Result<()> {
    let routes = guard.routes();
    let protected: Vec<String> = routes.protected_patterns().map(str::to_string).collect();
    let public: Vec<String> = routes.public_paths().map(str::to_string).collect();
    let invalid: Vec<String> = routes
        .invalid_patterns()
        .map(|(pattern, error)| format!("{pattern} ({error})"))
        .collect();

    output_list(output_format, "protected", &protected)?;
    output_list(output_format, "public", &public)?;
    if !invalid.is_empty() {
        output_list(output_format, "ignored", &invalid)?;
    }
    output_fields(
        output_format,
        &[
            ("login_path", json!(guard.login_path())),
            ("home_path", json!(guard.home_path())),
        ],
    )
}
