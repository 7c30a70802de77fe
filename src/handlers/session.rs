use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{session_cookie, ApiResponse, ApiResult};
use crate::session::{Identity, LayoutGate};

/// What the page shell needs to decide between rendering and redirecting
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub initialized: bool,
    pub is_logged_in: bool,
    pub identity: Option<Identity>,
    pub gate: &'static str,
    pub redirect_to: Option<String>,
}

/// GET /api/session - bootstrap a session from the request cookie
///
/// Always answers 200: a failed bootstrap is reported as an anonymous session.
pub async fn session_get(State(state): State<AppState>, jar: CookieJar) -> ApiResult<SessionView> {
    let cookie = session_cookie(&jar, &state.config.session.cookie_name);
    let mut ctx = state.session_for(cookie)?;

    if let Err(e) = ctx.bootstrap().await {
        tracing::debug!("Session bootstrap for page shell is anonymous: {}", e);
    }

    let gate = ctx.gate();
    let view = SessionView {
        initialized: ctx.initialized(),
        is_logged_in: ctx.is_logged_in(),
        identity: ctx.identity().cloned(),
        gate: gate.name(),
        redirect_to: match gate {
            LayoutGate::RedirectToLogin(path) => Some(path.to_string()),
            LayoutGate::Pending | LayoutGate::Render(_) => None,
        },
    };

    Ok(ApiResponse::success(view))
}

/// GET /api/session/identity - the current identity, or why there is none
pub async fn session_identity(State(state): State<AppState>, jar: CookieJar) -> ApiResult<Identity> {
    let cookie = session_cookie(&jar, &state.config.session.cookie_name);
    let mut ctx = state.session_for(cookie)?;

    ctx.bootstrap().await?;

    ctx.identity()
        .cloned()
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::unauthorized("No active session"))
}

/// POST /api/session/logout - best-effort backend logout, then drop the cookie and go home
pub async fn session_logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let cookie_name = state.config.session.cookie_name.clone();
    let cookie = session_cookie(&jar, &cookie_name).map(str::to_string);

    let redirect_to = match state.session_for(cookie.as_deref()) {
        Ok(mut ctx) => ctx.logout().await.redirect_to,
        Err(e) => {
            tracing::warn!("Skipping backend logout: {}", e);
            crate::session::context::ROOT_PATH.to_string()
        }
    };

    let removal = Cookie::build((cookie_name, ""))
        .path("/")
        .http_only(true)
        .secure(state.config.session.cookie_secure);
    let jar = jar.remove(removal);
    (jar, Redirect::to(&redirect_to))
}
