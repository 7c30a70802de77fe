use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::guard::{GuardError, RouteGuard, RouteTable};

/// Sections of the dashboard that require a session
pub const PROTECTED_SECTIONS: &[&str] = &[
    "acceuil",
    "bureaux",
    "classes",
    "incidents",
    "rapports",
    "notifications",
    "depot",
    "equipements",
    "profil",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub routes: RouteConfig,
    pub server: ServerConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub health_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    pub protected: Vec<String>,
    pub public: Vec<String>,
    pub login_path: String,
    pub home_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid API base URL '{url}': {source}")]
    InvalidApiUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid route configuration: {0}")]
    Routes(#[from] GuardError),
}

impl RouteConfig {
    pub fn default_protected() -> Vec<String> {
        PROTECTED_SECTIONS
            .iter()
            .map(|section| format!("/{section}/:path*"))
            .collect()
    }

    fn defaults() -> Self {
        Self {
            protected: Self::default_protected(),
            public: vec!["/".to_string(), "/login".to_string()],
            login_path: "/".to_string(),
            home_path: "/acceuil".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(|key| env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        // API overrides
        if let Some(v) = lookup("PARC_API_URL") {
            self.api.base_url = v;
        }
        if let Some(v) = lookup("PARC_API_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().unwrap_or(self.api.request_timeout_secs);
        }

        // Session overrides
        if let Some(v) = lookup("PARC_SESSION_COOKIE") {
            if !v.trim().is_empty() {
                self.session.cookie_name = v.trim().to_string();
            }
        }
        if let Some(v) = lookup("PARC_COOKIE_SECURE") {
            self.session.cookie_secure = v.parse().unwrap_or(self.session.cookie_secure);
        }

        // Route overrides
        if let Some(v) = lookup("PARC_PROTECTED_ROUTES") {
            self.routes.protected = split_list(&v);
        }
        if let Some(v) = lookup("PARC_PUBLIC_ROUTES") {
            self.routes.public = split_list(&v);
        }
        if let Some(v) = lookup("PARC_LOGIN_PATH") {
            self.routes.login_path = v;
        }
        if let Some(v) = lookup("PARC_HOME_PATH") {
            self.routes.home_path = v;
        }

        // Server overrides
        if let Some(port) = lookup("PARC_PORT")
            .or_else(|| lookup("PORT"))
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Some(v) = lookup("PARC_STATIC_DIR") {
            self.server.static_dir = Some(v).filter(|s| !s.is_empty());
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:8000".to_string(),
                request_timeout_secs: 10,
                health_timeout_secs: 5,
            },
            session: SessionConfig {
                cookie_name: "Authentication".to_string(),
                cookie_secure: false,
            },
            routes: RouteConfig::defaults(),
            server: ServerConfig {
                port: 3000,
                static_dir: Some("public".to_string()),
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://api.staging.parc.example.com".to_string(),
                request_timeout_secs: 8,
                health_timeout_secs: 3,
            },
            session: SessionConfig {
                cookie_name: "Authentication".to_string(),
                cookie_secure: true,
            },
            routes: RouteConfig::defaults(),
            server: ServerConfig {
                port: 3000,
                static_dir: Some("public".to_string()),
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.parc.example.com".to_string()],
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://api.parc.example.com".to_string(),
                request_timeout_secs: 5,
                health_timeout_secs: 2,
            },
            session: SessionConfig {
                cookie_name: "Authentication".to_string(),
                cookie_secure: true,
            },
            routes: RouteConfig::defaults(),
            server: ServerConfig {
                port: 3000,
                static_dir: Some("public".to_string()),
            },
            security: SecurityConfig {
                enable_cors: false,
                cors_origins: vec!["https://parc.example.com".to_string()],
            },
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.api.health_timeout_secs)
    }

    pub fn route_guard(&self) -> Result<RouteGuard, ConfigError> {
        let table = RouteTable::new(&self.routes.protected, &self.routes.public)?;
        Ok(RouteGuard::new(table, &self.routes.login_path, &self.routes.home_path)?)
    }

    /// Check everything that can be checked without touching the network
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.api.base_url).map_err(|source| ConfigError::InvalidApiUrl {
            url: self.api.base_url.clone(),
            source,
        })?;
        self.route_guard()?;
        Ok(())
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
