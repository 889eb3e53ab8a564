//! Shared-secret guard for administrative routes.

use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::web::error::ApiError;

/// Header carrying the admin key.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Configured admin key. Empty means the routes are open.
#[derive(Debug, Clone, Default)]
pub struct AdminKey(Arc<str>);

impl AdminKey {
    /// Wrap a configured key.
    pub fn new(key: &str) -> Self {
        Self(Arc::from(key))
    }

    /// Whether a key is configured.
    pub fn is_set(&self) -> bool {
        !self.0.is_empty()
    }

    /// Check a presented key.
    pub fn accepts(&self, presented: Option<&str>) -> bool {
        if !self.is_set() {
            return true;
        }
        match presented {
            Some(p) => constant_time_eq(p.as_bytes(), self.0.as_bytes()),
            None => false,
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Reject requests without the configured admin key.
pub async fn require_admin_key(key: AdminKey, req: Request<Body>, next: Next) -> Response {
    let presented = req
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if !key.accepts(presented) {
        tracing::warn!(path = %req.uri().path(), "Admin request rejected: bad or missing key");
        return ApiError::unauthorized("Admin key required").into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_key_accepts_anything() {
        let key = AdminKey::default();
        assert!(!key.is_set());
        assert!(key.accepts(None));
        assert!(key.accepts(Some("whatever")));
    }

    #[test]
    fn test_set_key() {
        let key = AdminKey::new("s3cret");
        assert!(key.is_set());
        assert!(key.accepts(Some("s3cret")));
        assert!(!key.accepts(Some("s3cre")));
        assert!(!key.accepts(Some("S3CRET")));
        assert!(!key.accepts(None));
    }
}
