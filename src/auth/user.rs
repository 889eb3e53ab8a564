//! User records as persisted in the user store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::password::Credentials;

/// A persisted user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Unique user ID.
    pub id: String,
    /// Display name; also accepted as a login identifier.
    pub name: String,
    /// Email address (case-insensitive for lookups).
    pub email: String,
    /// Base64 PBKDF2 salt. Absent until the account is first used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
    /// Base64 PBKDF2 derived key. Absent until the account is first used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Consecutive failed login attempts.
    #[serde(default)]
    pub failed_attempts: u32,
    /// Lockout expiry, stored as epoch milliseconds.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub locked_until: Option<DateTime<Utc>>,
    /// Whether login requires a one-time code.
    #[serde(default)]
    pub two_factor: bool,
    /// Whether the next login must set a new password.
    #[serde(default)]
    pub must_change_password: bool,
}

impl UserRecord {
    /// Create a record without credentials.
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            salt: None,
            hash: None,
            failed_attempts: 0,
            locked_until: None,
            two_factor: false,
            must_change_password: false,
        }
    }

    /// Stored credentials, if both salt and hash are present.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.salt, &self.hash) {
            (Some(salt), Some(hash)) => Some(Credentials {
                salt: salt.clone(),
                hash: hash.clone(),
            }),
            _ => None,
        }
    }

    /// Replace the stored credentials.
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.salt = Some(credentials.salt);
        self.hash = Some(credentials.hash);
    }

    /// Whether a lockout is in force at `now`.
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }

    /// Reset the failure counter and lift any lockout.
    pub fn clear_lockout(&mut self) {
        self.failed_attempts = 0;
        self.locked_until = None;
    }

    /// Whether `email` matches this user, ignoring case.
    pub fn has_email(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }

    /// Whether `name` matches this user, ignoring case.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    /// Profile safe to hand to clients.
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    /// Administrative view of the account.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            failed_attempts: self.failed_attempts,
            locked_until: self.locked_until,
            two_factor: self.two_factor,
            must_change_password: self.must_change_password,
        }
    }
}

/// Public user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    /// User ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

/// User account as listed to administrators.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// User ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Consecutive failed login attempts.
    pub failed_attempts: u32,
    /// Lockout expiry (epoch milliseconds).
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub locked_until: Option<DateTime<Utc>>,
    /// Whether login requires a one-time code.
    pub two_factor: bool,
    /// Whether the next login must set a new password.
    pub must_change_password: bool,
}

/// Administrative changes to an account.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    /// New value for the second-factor flag.
    #[serde(default)]
    pub two_factor: Option<bool>,
    /// Clear the lockout and failure counter when true.
    #[serde(default)]
    pub reset_lock: Option<bool>,
}

impl UserPatch {
    /// Apply the patch to a record.
    pub fn apply(&self, user: &mut UserRecord) {
        if let Some(two_factor) = self.two_factor {
            user.two_factor = two_factor;
        }
        if self.reset_lock == Some(true) {
            user.clear_lockout();
        }
    }
}

/// Store key for a user record.
pub fn user_key(user: &UserRecord) -> String {
    user.id.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    #[test]
    fn test_deserialize_minimal_record() {
        let user: UserRecord = serde_json::from_value(json!({
            "id": "u1",
            "name": "Huda",
            "email": "huda@example.org"
        }))
        .unwrap();

        assert_eq!(user.failed_attempts, 0);
        assert!(user.locked_until.is_none());
        assert!(!user.two_factor);
        assert!(!user.must_change_password);
        assert!(user.credentials().is_none());
    }

    #[test]
    fn test_serialize_uses_camel_case_and_millis() {
        let mut user = UserRecord::new("u1", "Huda", "huda@example.org");
        user.locked_until = Some(Utc.timestamp_millis_opt(1_700_000_000_000).unwrap());
        user.failed_attempts = 5;

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["failedAttempts"], 5);
        assert_eq!(value["lockedUntil"], 1_700_000_000_000i64);
        assert_eq!(value["mustChangePassword"], false);
        assert!(value.get("salt").is_none());
    }

    #[test]
    fn test_credentials_require_both_parts() {
        let mut user = UserRecord::new("u1", "Huda", "huda@example.org");
        user.salt = Some("c2FsdA==".to_string());
        assert!(user.credentials().is_none());

        user.set_credentials(Credentials {
            salt: "c2FsdA==".to_string(),
            hash: "aGFzaA==".to_string(),
        });
        assert!(user.credentials().is_some());
    }

    #[test]
    fn test_is_locked() {
        let now = Utc::now();
        let mut user = UserRecord::new("u1", "Huda", "huda@example.org");
        assert!(!user.is_locked(now));

        user.locked_until = Some(now + Duration::minutes(1));
        assert!(user.is_locked(now));

        user.locked_until = Some(now - Duration::minutes(1));
        assert!(!user.is_locked(now));
    }

    #[test]
    fn test_case_insensitive_matching() {
        let user = UserRecord::new("u1", "Huda", "Huda@Example.org");
        assert!(user.has_email("huda@example.ORG"));
        assert!(user.has_name("HUDA"));
        assert!(!user.has_name("huda2"));
    }

    #[test]
    fn test_patch_apply() {
        let mut user = UserRecord::new("u1", "Huda", "huda@example.org");
        user.failed_attempts = 3;
        user.locked_until = Some(Utc::now());

        UserPatch {
            two_factor: Some(true),
            reset_lock: Some(false),
        }
        .apply(&mut user);
        assert!(user.two_factor);
        assert_eq!(user.failed_attempts, 3);

        UserPatch {
            two_factor: None,
            reset_lock: Some(true),
        }
        .apply(&mut user);
        assert!(user.two_factor);
        assert_eq!(user.failed_attempts, 0);
        assert!(user.locked_until.is_none());
    }
}
