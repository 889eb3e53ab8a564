//! One-time codes for the second login factor.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of digits in a one-time code.
pub const OTP_DIGITS: usize = 6;

/// A code on file for one user, keyed by user id in the OTP store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpEntry {
    /// The numeric code.
    pub code: String,
    /// Expiry as epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

impl OtpEntry {
    /// Whether the entry has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Generate a random six-digit code.
pub fn generate_code() -> String {
    let n: u32 = rand::rng().random_range(100_000..1_000_000);
    n.to_string()
}
