mod common;

use anyhow::Result;

use parc_edge::cli::commands::auth::{self, AuthCommands};
use parc_edge::cli::commands::server::{self, ServerCommands};
use parc_edge::cli::config::load_environment_config_from;
use parc_edge::cli::{OutputFormat, Target};

// One test per binary: the CLI reads its config dir from the process environment
#[tokio::test]
async fn cli_commands_update_the_saved_environment() -> Result<()> {
    let dir = tempfile::tempdir()?;
    std::env::set_var("PARC_CLI_CONFIG_DIR", dir.path());

    let backend = common::spawn_backend(common::Behavior::authenticated()).await?;
    let target = Target {
        api_url: backend.base_url.clone(),
        cookie: None,
    };

    // server use
    let cmd = ServerCommands::Use {
        url: backend.base_url.clone(),
    };
    server::handle(cmd, &target, OutputFormat::Json).await?;
    let saved = load_environment_config_from(dir.path())?;
    assert_eq!(saved.api_url.as_deref(), Some(backend.base_url.as_str()));

    let cmd = ServerCommands::Use {
        url: "ftp://backend".into(),
    };
    assert!(server::handle(cmd, &target, OutputFormat::Json).await.is_err());

    // auth cookie
    let cmd = AuthCommands::Cookie {
        token: "opaque-token".into(),
    };
    auth::handle(cmd, &target, OutputFormat::Json).await?;
    let saved = load_environment_config_from(dir.path())?;
    assert_eq!(saved.cookie.as_deref(), Some("opaque-token"));

    // auth forget
    auth::handle(AuthCommands::Forget, &target, OutputFormat::Json).await?;
    let saved = load_environment_config_from(dir.path())?;
    assert_eq!(saved.cookie, None);
    assert_eq!(saved.api_url.as_deref(), Some(backend.base_url.as_str()));

    // auth whoami, with and without a cookie
    let signed_in = Target::resolve(None, Some("opaque-token".into()), &saved);
    assert_eq!(signed_in.api_url, backend.base_url);
    auth::handle(AuthCommands::Whoami, &signed_in, OutputFormat::Json).await?;
    assert!(auth::handle(AuthCommands::Whoami, &target, OutputFormat::Json).await.is_err());

    // auth logout forgets the cookie even when the backend refuses
    for behavior in [
        common::Behavior::authenticated(),
        common::Behavior::rejecting(),
    ] {
        let backend = common::spawn_backend(behavior).await?;
        auth::handle(
            AuthCommands::Cookie {
                token: "opaque-token".into(),
            },
            &target,
            OutputFormat::Json,
        )
        .await?;

        let signed_in = Target {
            api_url: backend.base_url.clone(),
            cookie: Some("opaque-token".into()),
        };
        auth::handle(AuthCommands::Logout, &signed_in, OutputFormat::Json).await?;

        assert_eq!(backend.hits.logout(), 1);
        assert_eq!(
            backend.hits.last_cookie().as_deref(),
            Some("Authentication=opaque-token")
        );
        assert_eq!(load_environment_config_from(dir.path())?.cookie, None);
    }

    Ok(())
}
