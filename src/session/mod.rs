pub mod client;
pub mod context;
pub mod error;
pub mod identity;

pub use client::{HttpIdentityApi, IdentityApi};
pub use context::{LayoutGate, LogoutOutcome, SessionContext, SessionState};
pub use error::SessionError;
pub use identity::Identity;
