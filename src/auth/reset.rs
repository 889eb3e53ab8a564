//! Password-reset tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pending reset, keyed by token in the reset store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetEntry {
    /// Email of the account being reset.
    pub email: String,
    /// Expiry as epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

impl ResetEntry {
    /// Whether the token has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Mint a fresh random reset token.
pub fn generate_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
