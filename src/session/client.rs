use async_trait::async_trait;
use reqwest::header::COOKIE;
use url::Url;

use super::error::SessionError;
use super::identity::Identity;

pub const IDENTITY_ENDPOINT: &str = "auth/me";
pub const LOGOUT_ENDPOINT: &str = "auth/logout";

/// Backend calls the session context depends on
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// Ask the backend who owns the current credentials
    async fn fetch_identity(&self) -> Result<Identity, SessionError>;

    /// Tell the backend to end the current session
    async fn logout(&self) -> Result<(), SessionError>;

    /// Whether there is anything to present to the backend at all
    fn has_credentials(&self) -> bool {
        true
    }
}

/// `IdentityApi` over the REST backend, carrying the session cookie on every call
#[derive(Debug, Clone)]
pub struct HttpIdentityApi {
    client: reqwest::Client,
    base_url: Url,
    cookie_name: String,
    cookie: Option<String>,
}

impl HttpIdentityApi {
    pub fn new(
        base_url: &str,
        cookie_name: impl Into<String>,
        cookie: Option<String>,
    ) -> Result<Self, SessionError> {
        Self::with_client(reqwest::Client::new(), base_url, cookie_name, cookie)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        cookie_name: impl Into<String>,
        cookie: Option<String>,
    ) -> Result<Self, SessionError> {
        // Url::join drops the last path segment unless it ends in '/'
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{base_url}/"))?
        };

        Ok(Self {
            client,
            base_url,
            cookie_name: cookie_name.into(),
            cookie: cookie.filter(|c| !c.is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn has_cookie(&self) -> bool {
        self.cookie.is_some()
    }

    fn cookie_header(&self) -> Result<String, SessionError> {
        self.cookie
            .as_ref()
            .map(|value| format!("{}={}", self.cookie_name, value))
            .ok_or(SessionError::NoCookie)
    }
}

#[async_trait]
impl IdentityApi for HttpIdentityApi {
    fn has_credentials(&self) -> bool {
        self.has_cookie()
    }

    async fn fetch_identity(&self) -> Result<Identity, SessionError> {
        let cookie = self.cookie_header()?;
        let url = self.base_url.join(IDENTITY_ENDPOINT)?;

        tracing::debug!("Fetching identity from {}", url);
        let response = self.client.get(url).header(COOKIE, cookie).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| SessionError::Decode(e.to_string()))
    }

    async fn logout(&self) -> Result<(), SessionError> {
        let cookie = self.cookie_header()?;
        let url = self.base_url.join(LOGOUT_ENDPOINT)?;

        tracing::debug!("Posting logout to {}", url);
        let response = self.client.post(url).header(COOKIE, cookie).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SessionError::Status(status.as_u16()))
        }
    }
}
