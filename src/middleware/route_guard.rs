use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::app::AppState;

/// Edge route guard: redirects on cookie presence and path, never validates the cookie
pub async fn route_guard_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let has_cookie = session_cookie(&jar, &state.config.session.cookie_name).is_some();
    let decision = state.guard.decide(request.uri().path(), has_cookie);

    match decision.location() {
        None => next.run(request).await,
        Some(location) => {
            tracing::debug!(
                "Route guard {:?} for {} (cookie present: {})",
                decision,
                request.uri().path(),
                has_cookie
            );
            Redirect::temporary(location).into_response()
        }
    }
}

/// Session cookie value, treating an empty value as absent
pub fn session_cookie<'a>(jar: &'a CookieJar, name: &str) -> Option<&'a str> {
    jar.get(name).map(|c| c.value()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, HeaderValue};

    fn jar(cookie: &str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn finds_named_cookie() {
        let jar = jar("theme=dark; Authentication=abc.def");
        assert_eq!(session_cookie(&jar, "Authentication"), Some("abc.def"));
    }

    #[test]
    fn empty_or_missing_cookie_is_absent() {
        assert_eq!(session_cookie(&jar("Authentication="), "Authentication"), None);
        assert_eq!(session_cookie(&jar("theme=dark"), "Authentication"), None);
    }

    #[test]
    fn cookie_name_is_case_sensitive() {
        assert_eq!(session_cookie(&jar("authentication=abc"), "Authentication"), None);
    }
}
