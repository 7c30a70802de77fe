use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Claims of the authenticated principal as returned by `GET /auth/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub sub: String,
    pub email: String,
    pub roles: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prenom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl Identity {
    pub fn new(sub: impl Into<String>, email: impl Into<String>, roles: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            email: email.into(),
            roles: roles.into(),
            nom: None,
            prenom: None,
            iat: None,
            exp: None,
        }
    }

    /// "Prenom Nom" when the backend sent names, otherwise the email
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.prenom.as_deref(), self.nom.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if parts.is_empty() {
            self.email.clone()
        } else {
            parts.join(" ")
        }
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat.and_then(|ts| Utc.timestamp_opt(ts, 0).single())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|ts| Utc.timestamp_opt(ts, 0).single())
    }

    /// Informational only, the session context never drops an identity on expiry
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map_or(false, |exp| exp <= now)
    }
}
