//! Edge route guard
//!
//! Decides, for a single request, whether to let it through or bounce it to the
//! login or landing page. The decision is presence-only: the session cookie is
//! never decoded or validated here, that is the backend's job on `/auth/me`.

pub mod error;
pub mod pattern;

use serde::Serialize;

pub use error::{GuardError, PatternError};
pub use pattern::{normalize_path, PathPattern};

/// Outcome of running the guard on one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "location", rename_all = "snake_case")]
pub enum Decision {
    Continue,
    RedirectToLogin(String),
    RedirectToHome(String),
}

impl Decision {
    pub fn location(&self) -> Option<&str> {
        match self {
            Decision::Continue => None,
            Decision::RedirectToLogin(path) | Decision::RedirectToHome(path) => Some(path),
        }
    }
}

/// A protected entry; malformed patterns are kept so they can be reported, but never match
#[derive(Debug, Clone)]
enum Matcher {
    Compiled(PathPattern),
    Invalid { source: String, error: PatternError },
}

impl Matcher {
    fn compile(source: &str) -> Self {
        match PathPattern::parse(source) {
            Ok(pattern) => Matcher::Compiled(pattern),
            Err(error) => {
                tracing::warn!("Ignoring malformed protected route '{}': {}", source, error);
                Matcher::Invalid {
                    source: source.to_string(),
                    error,
                }
            }
        }
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            Matcher::Compiled(pattern) => pattern.matches(path),
            Matcher::Invalid { .. } => false,
        }
    }

    fn source(&self) -> &str {
        match self {
            Matcher::Compiled(pattern) => pattern.as_str(),
            Matcher::Invalid { source, .. } => source,
        }
    }
}

/// Static classification of paths into protected patterns and public exact paths
#[derive(Debug, Clone)]
pub struct RouteTable {
    protected: Vec<Matcher>,
    public: Vec<String>,
}

impl RouteTable {
    pub fn new<P, Q>(protected: P, public: Q) -> Result<Self, GuardError>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        Q: IntoIterator,
        Q::Item: AsRef<str>,
    {
        let protected: Vec<Matcher> = protected
            .into_iter()
            .map(|p| Matcher::compile(p.as_ref()))
            .collect();
        let public: Vec<String> = public.into_iter().map(|p| p.as_ref().to_string()).collect();

        for path in &public {
            if let Some(m) = protected.iter().find(|m| m.matches(path)) {
                return Err(GuardError::OverlappingRoute {
                    path: path.clone(),
                    pattern: m.source().to_string(),
                });
            }
        }

        Ok(Self { protected, public })
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_match(path).is_some()
    }

    fn protected_match(&self, path: &str) -> Option<&str> {
        self.protected.iter().find(|m| m.matches(path)).map(Matcher::source)
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public.iter().any(|p| p == path)
    }

    pub fn protected_patterns(&self) -> impl Iterator<Item = &str> {
        self.protected.iter().map(Matcher::source)
    }

    pub fn public_paths(&self) -> impl Iterator<Item = &str> {
        self.public.iter().map(String::as_str)
    }

    /// Protected entries that failed to compile, with the reason
    pub fn invalid_patterns(&self) -> impl Iterator<Item = (&str, &PatternError)> {
        self.protected.iter().filter_map(|m| match m {
            Matcher::Invalid { source, error } => Some((source.as_str(), error)),
            Matcher::Compiled(_) => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    routes: RouteTable,
    login_path: String,
    home_path: String,
}

impl RouteGuard {
    pub fn new(
        routes: RouteTable,
        login_path: impl Into<String>,
        home_path: impl Into<String>,
    ) -> Result<Self, GuardError> {
        let login_path = login_path.into();
        let home_path = home_path.into();

        for target in [&login_path, &home_path] {
            if !target.starts_with('/') {
                return Err(GuardError::InvalidRedirect(target.clone()));
            }
        }

        if routes.is_public(&normalize_path(&home_path)) {
            return Err(GuardError::HomeIsPublic(home_path));
        }
        if let Some(pattern) = routes.protected_match(&normalize_path(&login_path)) {
            return Err(GuardError::LoginIsProtected {
                path: login_path,
                pattern: pattern.to_string(),
            });
        }

        Ok(Self {
            routes,
            login_path,
            home_path,
        })
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn home_path(&self) -> &str {
        &self.home_path
    }

    /// Classify a raw request path; it is normalized first so encoded or dotted
    /// spellings of a protected section are caught
    pub fn decide(&self, path: &str, has_cookie: bool) -> Decision {
        let path = normalize_path(path);
        if !has_cookie && self.routes.is_protected(&path) {
            Decision::RedirectToLogin(self.login_path.clone())
        } else if has_cookie && self.routes.is_public(&path) {
            Decision::RedirectToHome(self.home_path.clone())
        } else {
            Decision::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTIONS: &[&str] = &[
        "/acceuil/:path*",
        "/bureaux/:path*",
        "/classes/:path*",
        "/incidents/:path*",
        "/depot/:path*",
    ];

    fn guard() -> RouteGuard {
        let table = RouteTable::new(SECTIONS, ["/", "/login"]).unwrap();
        RouteGuard::new(table, "/", "/acceuil").unwrap()
    }

    #[test]
    fn protected_without_cookie_redirects_to_login() {
        let g = guard();
        for path in ["/acceuil", "/bureaux", "/bureaux/4", "/classes/b12/equipements", "/depot/"] {
            assert_eq!(g.decide(path, false), Decision::RedirectToLogin("/".into()), "{path}");
        }
    }

    #[test]
    fn public_with_cookie_redirects_home() {
        let g = guard();
        assert_eq!(g.decide("/", true), Decision::RedirectToHome("/acceuil".into()));
        assert_eq!(g.decide("/login", true), Decision::RedirectToHome("/acceuil".into()));
    }

    #[test]
    fn public_match_is_exact() {
        let g = guard();
        assert_eq!(g.decide("/login/", true), Decision::Continue);
        assert_eq!(g.decide("/login/reset", true), Decision::Continue);
    }

    #[test]
    fn protected_with_cookie_continues() {
        let g = guard();
        assert_eq!(g.decide("/bureaux/4", true), Decision::Continue);
    }

    #[test]
    fn public_without_cookie_continues() {
        let g = guard();
        assert_eq!(g.decide("/", false), Decision::Continue);
        assert_eq!(g.decide("/login", false), Decision::Continue);
    }

    #[test]
    fn unclassified_paths_always_continue() {
        let g = guard();
        for path in ["/health", "/api/session", "/favicon.ico", "/bureauxx"] {
            assert_eq!(g.decide(path, false), Decision::Continue, "{path}");
            assert_eq!(g.decide(path, true), Decision::Continue, "{path}");
        }
    }

    #[test]
    fn malformed_pattern_never_matches() {
        let table = RouteTable::new(["bureaux", "/classes/:rest*/x"], ["/"]).unwrap();
        assert_eq!(table.invalid_patterns().count(), 2);
        let g = RouteGuard::new(table, "/", "/acceuil").unwrap();
        assert_eq!(g.decide("/bureaux", false), Decision::Continue);
        assert_eq!(g.decide("/classes/a/x", false), Decision::Continue);
    }

    #[test]
    fn overlapping_public_path_is_rejected() {
        let err = RouteTable::new(["/:path*"], ["/", "/login"]).unwrap_err();
        assert_eq!(
            err,
            GuardError::OverlappingRoute {
                path: "/".into(),
                pattern: "/:path*".into()
            }
        );
    }

    #[test]
    fn relative_redirect_is_rejected() {
        let table = RouteTable::new(SECTIONS, ["/"]).unwrap();
        assert!(matches!(
            RouteGuard::new(table, "login", "/acceuil"),
            Err(GuardError::InvalidRedirect(_))
        ));
    }

    #[test]
    fn encoded_and_dotted_paths_are_still_protected() {
        let g = guard();
        for path in ["/%62ureaux/", "/./bureaux/", "/acceuil/../bureaux/4", "/%2e/classes", "//depot"] {
            assert_eq!(g.decide(path, false), Decision::RedirectToLogin("/".into()), "{path}");
        }
        assert_eq!(g.decide("/%6Cogin", true), Decision::RedirectToHome("/acceuil".into()));
    }

    #[test]
    fn public_landing_path_is_rejected() {
        let table = RouteTable::new(SECTIONS, ["/", "/login"]).unwrap();
        assert_eq!(
            RouteGuard::new(table, "/", "/login").unwrap_err(),
            GuardError::HomeIsPublic("/login".into())
        );
    }

    #[test]
    fn protected_login_path_is_rejected() {
        let table = RouteTable::new(SECTIONS, ["/"]).unwrap();
        assert_eq!(
            RouteGuard::new(table, "/bureaux/login", "/acceuil").unwrap_err(),
            GuardError::LoginIsProtected {
                path: "/bureaux/login".into(),
                pattern: "/bureaux/:path*".into()
            }
        );
    }

    #[test]
    fn decision_serializes_with_location() {
        let json = serde_json::to_value(Decision::RedirectToHome("/acceuil".into())).unwrap();
        assert_eq!(json["decision"], "redirect_to_home");
        assert_eq!(json["location"], "/acceuil");
        let json = serde_json::to_value(Decision::Continue).unwrap();
        assert_eq!(json["decision"], "continue");
    }
}
