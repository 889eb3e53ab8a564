//! Error types for caredesk.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Common error type for caredesk.
#[derive(Error, Debug)]
pub enum CaredeskError {
    /// A required field was absent or empty.
    #[error("missing required field: {0}")]
    Missing(&'static str),

    /// No user matches the given identifier.
    #[error("user not found")]
    UserNotFound,

    /// The account is temporarily locked after repeated failures.
    #[error("account locked until {until}")]
    Locked {
        /// When the lockout lifts.
        until: DateTime<Utc>,
    },

    /// Wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No one-time code is on file for the user.
    #[error("no one-time code issued")]
    NoOtp,

    /// The code or token is past its expiry.
    #[error("expired")]
    Expired,

    /// The one-time code does not match.
    #[error("invalid code")]
    Invalid,

    /// Unknown password-reset token.
    #[error("invalid token")]
    InvalidToken,

    /// New password does not satisfy the password policy.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Reservation payload is malformed.
    #[error("invalid reservation: {0}")]
    InvalidReservation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Reservation overlaps an existing one for the same room.
    #[error("reservation conflicts with {with}")]
    Conflict {
        /// Id of the reservation that overlaps.
        with: String,
    },

    /// A backing JSON document could not be parsed.
    #[error("corrupt store at {}: {source}", path.display())]
    CorruptStore {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser error.
        source: serde_json::Error,
    },

    /// Serialization error while writing a store.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Password hashing failure.
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for caredesk operations.
pub type Result<T> = std::result::Result<T, CaredeskError>;
