#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use parc_edge::app::AppState;
use parc_edge::config::AppConfig;

/// How the fake identity backend answers
#[derive(Clone)]
pub struct Behavior {
    pub root_status: StatusCode,
    pub me_status: StatusCode,
    pub me_body: Value,
    pub me_delay: Option<Duration>,
    pub logout_status: StatusCode,
}

impl Behavior {
    pub fn authenticated() -> Self {
        Self {
            root_status: StatusCode::OK,
            me_status: StatusCode::OK,
            me_body: json!({"sub": "u1", "email": "a@b.com", "roles": "ADMIN"}),
            me_delay: None,
            logout_status: StatusCode::OK,
        }
    }

    pub fn rejecting() -> Self {
        Self {
            root_status: StatusCode::OK,
            me_status: StatusCode::UNAUTHORIZED,
            me_body: json!({"message": "Unauthorized", "statusCode": 401}),
            me_delay: None,
            logout_status: StatusCode::UNAUTHORIZED,
        }
    }

    pub fn with_logout_status(mut self, status: StatusCode) -> Self {
        self.logout_status = status;
        self
    }

    pub fn with_root_status(mut self, status: StatusCode) -> Self {
        self.root_status = status;
        self
    }

    pub fn with_me_delay(mut self, delay: Duration) -> Self {
        self.me_delay = Some(delay);
        self
    }
}

/// Calls observed by the fake backend
#[derive(Default)]
pub struct Hits {
    pub me: AtomicUsize,
    pub logout: AtomicUsize,
    pub last_cookie: Mutex<Option<String>>,
}

impl Hits {
    pub fn me(&self) -> usize {
        self.me.load(Ordering::SeqCst)
    }

    pub fn logout(&self) -> usize {
        self.logout.load(Ordering::SeqCst)
    }

    pub fn last_cookie(&self) -> Option<String> {
        self.last_cookie.lock().ok().and_then(|c| c.clone())
    }

    fn record_cookie(&self, headers: &HeaderMap) {
        let cookie = headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if let Ok(mut slot) = self.last_cookie.lock() {
            *slot = cookie;
        }
    }
}

#[derive(Clone)]
struct MockState {
    behavior: Behavior,
    hits: Arc<Hits>,
}

pub struct MockBackend {
    pub base_url: String,
    pub hits: Arc<Hits>,
}

pub async fn spawn_backend(behavior: Behavior) -> Result<MockBackend> {
    let hits = Arc::new(Hits::default());
    let state = MockState {
        behavior,
        hits: hits.clone(),
    };

    let router = Router::new()
        .route("/", get(root))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind mock backend")?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(MockBackend {
        base_url: format!("http://{}", addr),
        hits,
    })
}

/// A base URL nothing listens on
pub async fn dead_backend_url() -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{}", addr))
}

async fn root(State(state): State<MockState>) -> impl IntoResponse {
    (state.behavior.root_status, "parc api")
}

async fn me(State(state): State<MockState>, headers: HeaderMap) -> impl IntoResponse {
    state.hits.me.fetch_add(1, Ordering::SeqCst);
    state.hits.record_cookie(&headers);
    if let Some(delay) = state.behavior.me_delay {
        tokio::time::sleep(delay).await;
    }
    (state.behavior.me_status, Json(state.behavior.me_body.clone()))
}

async fn logout(State(state): State<MockState>, headers: HeaderMap) -> StatusCode {
    state.hits.logout.fetch_add(1, Ordering::SeqCst);
    state.hits.record_cookie(&headers);
    state.behavior.logout_status
}

/// Edge state pointed at `base_url`, without a static dir
pub fn edge_state(base_url: &str) -> AppState {
    edge_state_with(base_url, |_| {})
}

/// Edge state pointed at `base_url`, with further config tweaks
pub fn edge_state_with(base_url: &str, tweak: impl FnOnce(&mut AppConfig)) -> AppState {
    let mut config = AppConfig::development();
    config.api.base_url = base_url.to_string();
    config.api.request_timeout_secs = 2;
    config.server.static_dir = None;
    tweak(&mut config);
    AppState::new(config).expect("valid test config")
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

pub fn post_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

pub async fn body_json(response: axum::response::Response) -> Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
