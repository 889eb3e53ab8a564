//! Password hashing and validation for caredesk.
//!
//! Uses PBKDF2-HMAC-SHA256 with a per-user random salt. Salt and derived
//! key are stored base64-encoded next to the user record.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::Rng;
use sha2::Sha256;
use thiserror::Error;

use crate::{CaredeskError, Result};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 310_000;

/// Derived key length in bytes.
pub const KEY_LENGTH: usize = 32;

/// Salt length in bytes.
pub const SALT_LENGTH: usize = 16;

/// Password policy violations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PasswordError {
    /// Password is too short.
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,

    /// Password is too long.
    #[error("password must be at most {MAX_PASSWORD_LENGTH} characters")]
    TooLong,
}

impl From<PasswordError> for CaredeskError {
    fn from(e: PasswordError) -> Self {
        CaredeskError::WeakPassword(e.to_string())
    }
}

/// Stored salt and derived key, both base64.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Base64 salt.
    pub salt: String,
    /// Base64 derived key.
    pub hash: String,
}

/// PBKDF2 hasher with a fixed iteration count.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

impl PasswordHasher {
    /// Create a hasher using `iterations` rounds.
    pub fn new(iterations: u32) -> Self {
        Self { iterations }
    }

    /// Iteration count in use.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hash a password under a fresh random salt.
    pub fn hash(&self, password: &str) -> Credentials {
        let mut salt = [0u8; SALT_LENGTH];
        rand::rng().fill(&mut salt[..]);

        Credentials {
            salt: STANDARD.encode(salt),
            hash: self.derive(password, &salt),
        }
    }

    /// Check a password against stored credentials.
    ///
    /// Returns `Ok(false)` on mismatch and an error only if the stored salt
    /// is not valid base64.
    pub fn verify(&self, password: &str, stored: &Credentials) -> Result<bool> {
        let salt = STANDARD
            .decode(&stored.salt)
            .map_err(|e| CaredeskError::Hash(format!("stored salt is not base64: {e}")))?;
        Ok(self.derive(password, &salt) == stored.hash)
    }

    fn derive(&self, password: &str, salt: &[u8]) -> String {
        let mut key = [0u8; KEY_LENGTH];
        pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, self.iterations, &mut key);
        STANDARD.encode(key)
    }
}

/// Validate password requirements.
///
/// # Examples
///
/// ```
/// use caredesk::auth::validate_password;
///
/// assert!(validate_password("short").is_err());
/// assert!(validate_password("valid_password_123").is_ok());
/// ```
pub fn validate_password(password: &str) -> std::result::Result<(), PasswordError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::TooLong);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> PasswordHasher {
        PasswordHasher::new(1_000)
    }

    #[test]
    fn test_known_vector() {
        // Published PBKDF2-HMAC-SHA256 vectors for "password" / "salt".
        let stored = Credentials {
            salt: "c2FsdA==".to_string(),
            hash: "Eg+2z/z4syxD5yJSVsT4N6hlSMkszDVICAWYfLcL4Xs=".to_string(),
        };
        let hasher = PasswordHasher::new(1);
        assert!(hasher.verify("password", &stored).unwrap());

        let stored = Credentials {
            salt: "c2FsdA==".to_string(),
            hash: "xeR41ZKIyEGqUw22hFxMjZYok6ABzk4RpJY4c6qYE0o=".to_string(),
        };
        assert!(PasswordHasher::new(4096).verify("password", &stored).unwrap());
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = fast();
        let creds = hasher.hash("correct_password");

        assert!(hasher.verify("correct_password", &creds).unwrap());
        assert!(!hasher.verify("wrong_password", &creds).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let hasher = fast();
        let a = hasher.hash("same_password");
        let b = hasher.hash("same_password");

        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_output_lengths() {
        let creds = fast().hash("whatever123");
        assert_eq!(STANDARD.decode(&creds.salt).unwrap().len(), SALT_LENGTH);
        assert_eq!(STANDARD.decode(&creds.hash).unwrap().len(), KEY_LENGTH);
    }

    #[test]
    fn test_iterations_matter() {
        let creds = PasswordHasher::new(1_000).hash("password123");
        assert!(!PasswordHasher::new(1_001).verify("password123", &creds).unwrap());
    }

    #[test]
    fn test_verify_bad_salt() {
        let stored = Credentials {
            salt: "***".to_string(),
            hash: String::new(),
        };
        assert!(matches!(
            fast().verify("x", &stored),
            Err(CaredeskError::Hash(_))
        ));
    }

    #[test]
    fn test_default_iterations() {
        assert_eq!(PasswordHasher::default().iterations(), 310_000);
    }

    #[test]
    fn test_validate_password_bounds() {
        assert_eq!(validate_password("short"), Err(PasswordError::TooShort));
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password(&"a".repeat(128)).is_ok());
        assert_eq!(
            validate_password(&"a".repeat(129)),
            Err(PasswordError::TooLong)
        );
    }

    #[test]
    fn test_validate_counts_characters() {
        // Eight Arabic letters are sixteen bytes but eight characters.
        assert!(validate_password("كلمةسرطو").is_ok());
    }

    #[test]
    fn test_password_error_into_weak_password() {
        let err: CaredeskError = PasswordError::TooShort.into();
        assert_eq!(
            err.to_string(),
            "weak password: password must be at least 8 characters"
        );
    }
}
