use std::future::Future;
use std::time::Duration;

use serde::Serialize;

use super::client::IdentityApi;
use super::error::SessionError;
use super::identity::Identity;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const ROOT_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "identity", rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    Loading,
    Authenticated(Identity),
    Anonymous,
}

/// What a layout that requires authentication should do right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutGate<'a> {
    /// Bootstrap has not settled, render nothing
    Pending,
    RedirectToLogin(&'a str),
    Render(&'a Identity),
}

impl LayoutGate<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            LayoutGate::Pending => "pending",
            LayoutGate::RedirectToLogin(_) => "redirect_to_login",
            LayoutGate::Render(_) => "render",
        }
    }
}

/// Result of `SessionContext::logout`; local state is anonymous whatever `remote` says
#[derive(Debug)]
pub struct LogoutOutcome {
    pub redirect_to: String,
    pub remote: Result<(), SessionError>,
}

/// Identity holder for one page load
///
/// Created per load and handed to whatever needs the session; nothing is shared
/// or cached between contexts, so every load bootstraps again.
pub struct SessionContext<A> {
    api: A,
    state: SessionState,
    timeout: Duration,
    login_path: String,
}

impl<A: IdentityApi> SessionContext<A> {
    /// Without credentials there is nobody to ask about, so the context starts anonymous
    pub fn new(api: A) -> Self {
        let state = if api.has_credentials() {
            SessionState::Uninitialized
        } else {
            SessionState::Anonymous
        };

        Self {
            api,
            state,
            timeout: DEFAULT_TIMEOUT,
            login_path: ROOT_PATH.to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.state {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn initialized(&self) -> bool {
        matches!(
            self.state,
            SessionState::Authenticated(_) | SessionState::Anonymous
        )
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    pub fn gate(&self) -> LayoutGate<'_> {
        match &self.state {
            SessionState::Uninitialized | SessionState::Loading => LayoutGate::Pending,
            SessionState::Anonymous => LayoutGate::RedirectToLogin(&self.login_path),
            SessionState::Authenticated(identity) => LayoutGate::Render(identity),
        }
    }

    /// Resolve the identity once. Any failure leaves the context anonymous and is
    /// returned so the caller can log it; the state is settled either way.
    pub async fn bootstrap(&mut self) -> Result<(), SessionError> {
        if self.initialized() {
            tracing::debug!("Session already bootstrapped, skipping identity fetch");
            return Ok(());
        }

        self.state = SessionState::Loading;

        match bounded(self.timeout, self.api.fetch_identity()).await {
            Ok(identity) => {
                tracing::debug!("Session authenticated as {} ({})", identity.sub, identity.roles);
                self.state = SessionState::Authenticated(identity);
                Ok(())
            }
            Err(e) => {
                tracing::debug!("Session bootstrap degraded to anonymous: {}", e);
                self.state = SessionState::Anonymous;
                Err(e)
            }
        }
    }

    /// Record an identity obtained elsewhere, e.g. by a login form
    pub fn login(&mut self, identity: Identity) {
        self.state = SessionState::Authenticated(identity);
    }

    pub async fn logout(&mut self) -> LogoutOutcome {
        let remote = bounded(self.timeout, self.api.logout()).await;
        if let Err(e) = &remote {
            tracing::warn!("Logout request failed, clearing local session anyway: {}", e);
        }

        self.state = SessionState::Anonymous;

        LogoutOutcome {
            redirect_to: ROOT_PATH.to_string(),
            remote,
        }
    }
}

async fn bounded<T, F>(timeout: Duration, call: F) -> Result<T, SessionError>
where
    F: Future<Output = Result<T, SessionError>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| SessionError::Timeout(timeout))?
}
