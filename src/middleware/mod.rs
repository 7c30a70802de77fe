pub mod response;
pub mod route_guard;

pub use response::{ApiResponse, ApiResult};
pub use route_guard::{route_guard_middleware, session_cookie};
