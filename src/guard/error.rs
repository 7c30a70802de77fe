use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("Empty path pattern")]
    Empty,

    #[error("Path pattern must start with '/': {0}")]
    NotAbsolute(String),

    #[error("Path pattern has an unnamed parameter: {0}")]
    EmptyParam(String),

    #[error("Repeating parameter must be the last segment: {0}")]
    WildcardNotLast(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("Public path '{path}' is also matched by protected pattern '{pattern}'")]
    OverlappingRoute { path: String, pattern: String },

    #[error("Redirect target must be an absolute path: {0}")]
    InvalidRedirect(String),

    #[error("Landing path '{0}' is public, signed-in visitors would be redirected to it forever")]
    HomeIsPublic(String),

    #[error("Login path '{path}' is matched by protected pattern '{pattern}', anonymous visitors would loop")]
    LoginIsProtected { path: String, pattern: String },
}
