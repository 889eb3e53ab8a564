//! Middleware for Web API.

pub mod admin_key;
pub mod cors;
pub mod rate_limit;

pub use admin_key::{require_admin_key, AdminKey, ADMIN_KEY_HEADER};
pub use cors::create_cors_layer;
pub use rate_limit::{login_rate_limit, RateLimitState};
