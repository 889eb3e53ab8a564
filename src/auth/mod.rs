//! Authentication module for caredesk.
//!
//! Password hashing, lockout after repeated failures, one-time codes for
//! the second factor, password-reset tokens and administrative overrides.

mod notifier;
mod otp;
mod password;
mod reset;
mod service;
mod user;

pub use notifier::{LogNotifier, Notifier};
pub use otp::{generate_code, OtpEntry, OTP_DIGITS};
pub use password::{
    validate_password, Credentials, PasswordError, PasswordHasher, DEFAULT_ITERATIONS,
    KEY_LENGTH, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH, SALT_LENGTH,
};
pub use reset::{generate_token, ResetEntry};
pub use service::{AuthPolicy, AuthService, LoginOutcome, ResetOutcome};
pub use user::{user_key, PublicUser, UserPatch, UserRecord, UserSummary};
