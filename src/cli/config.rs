use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ENV_FILE: &str = "env.json";

/// Persistent CLI selection: which backend to talk to and with which session cookie
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub api_url: Option<String>,
    pub cookie: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendStatus {
    Up,
    Down,
}

impl EnvironmentConfig {
    pub fn set_api_url(&mut self, url: impl Into<String>) {
        self.api_url = Some(url.into());
        self.updated_at = Some(Utc::now());
    }

    pub fn set_cookie(&mut self, cookie: impl Into<String>) {
        self.cookie = Some(cookie.into()).filter(|c: &String| !c.is_empty());
        self.updated_at = Some(Utc::now());
    }

    pub fn clear_cookie(&mut self) {
        self.cookie = None;
        self.updated_at = Some(Utc::now());
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("PARC_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("parc").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_environment_config() -> anyhow::Result<EnvironmentConfig> {
    load_environment_config_from(&get_config_dir()?)
}

pub fn save_environment_config(config: &EnvironmentConfig) -> anyhow::Result<()> {
    save_environment_config_to(&get_config_dir()?, config)
}

pub fn load_environment_config_from(dir: &Path) -> anyhow::Result<EnvironmentConfig> {
    let env_file = dir.join(ENV_FILE);

    if !env_file.exists() {
        return Ok(EnvironmentConfig::default());
    }

    let content = fs::read_to_string(env_file)?;
    let config: EnvironmentConfig = serde_json::from_str(&content)?;
    Ok(config)
}

pub fn save_environment_config_to(dir: &Path, config: &EnvironmentConfig) -> anyhow::Result<()> {
    let env_file = dir.join(ENV_FILE);

    let content = serde_json::to_string_pretty(config)?;
    fs::write(env_file, content)?;
    Ok(())
}

pub async fn ping_backend(client: &reqwest::Client, url: &str, timeout: std::time::Duration) -> BackendStatus {
    match client.get(url).timeout(timeout).send().await {
        Ok(response) if !response.status().is_server_error() => BackendStatus::Up,
        _ => BackendStatus::Down,
    }
}
