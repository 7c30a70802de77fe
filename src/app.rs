use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::{AppConfig, ConfigError, SecurityConfig};
use crate::guard::RouteGuard;
use crate::handlers;
use crate::middleware::route_guard_middleware;
use crate::session::{HttpIdentityApi, SessionContext, SessionError};

/// Shared, read-only state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub guard: Arc<RouteGuard>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let guard = config.route_guard()?;

        Ok(Self {
            config: Arc::new(config),
            guard: Arc::new(guard),
            http: reqwest::Client::new(),
        })
    }

    /// Fresh session context for one request, carrying that request's cookie
    pub fn session_for(&self, cookie: Option<&str>) -> Result<SessionContext<HttpIdentityApi>, SessionError> {
        let api = HttpIdentityApi::with_client(
            self.http.clone(),
            &self.config.api.base_url,
            &self.config.session.cookie_name,
            cookie.map(str::to_string),
        )?;

        Ok(SessionContext::new(api)
            .with_timeout(self.config.request_timeout())
            .with_login_path(&self.config.routes.login_path))
    }
}

pub fn app(state: AppState) -> Router {
    let router = Router::new()
        // Edge
        .route("/health", get(handlers::health))
        // Session bootstrap for the page shell
        .merge(session_routes());

    // Page shell
    let router = match &state.config.server.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.fallback(handlers::not_found),
    };

    router
        // Global middleware
        .layer(from_fn_with_state(state.clone(), route_guard_middleware))
        .layer(cors_layer(&state.config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn session_routes() -> Router<AppState> {
    use handlers::session;

    Router::new()
        .route("/api/session", get(session::session_get))
        .route("/api/session/identity", get(session::session_identity))
        .route("/api/session/logout", post(session::session_logout))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}
