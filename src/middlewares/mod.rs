pub mod auth;
pub mod cors;

pub use auth::{AuthMiddleware, extract_session_token};
pub use cors::create_cors;
