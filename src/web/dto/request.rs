//! Request DTOs for Web API.
//!
//! Fields are optional so that an absent field is reported as `missing`
//! by the service rather than as a deserialization failure.

use serde::Deserialize;

/// Login request.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    /// Email or display name.
    #[serde(default)]
    pub identifier: Option<String>,
    /// Password.
    #[serde(default)]
    pub password: Option<String>,
}

/// One-time code verification request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    /// User the code was issued to.
    #[serde(default)]
    pub user_id: Option<String>,
    /// The code.
    #[serde(default)]
    pub code: Option<String>,
}

/// Reset token check request.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyTokenRequest {
    /// Reset token.
    #[serde(default)]
    pub token: Option<String>,
}

/// Forgotten password request.
#[derive(Debug, Default, Deserialize)]
pub struct ForgotRequest {
    /// Account email.
    #[serde(default)]
    pub email: Option<String>,
}

/// Password reset request.
#[derive(Debug, Default, Deserialize)]
pub struct ResetRequest {
    /// Reset token.
    #[serde(default)]
    pub token: Option<String>,
    /// New password.
    #[serde(default)]
    pub password: Option<String>,
}

/// First-login password change request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstLoginRequest {
    /// User changing their password.
    #[serde(default)]
    pub user_id: Option<String>,
    /// New password.
    #[serde(default)]
    pub password: Option<String>,
}

/// Administrative password change request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPasswordRequest {
    /// Email or user id.
    #[serde(default)]
    pub identifier: Option<String>,
    /// User id, accepted when `identifier` is absent.
    #[serde(default)]
    pub user_id: Option<String>,
    /// New password.
    #[serde(default)]
    pub password: Option<String>,
    /// Force a change on next login.
    #[serde(default)]
    pub must_change_password: Option<bool>,
}

impl SetPasswordRequest {
    /// The account to update, preferring `identifier`.
    pub fn target(&self) -> &str {
        self.identifier
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.user_id.as_deref())
            .unwrap_or_default()
    }
}

/// Reservation listing filter.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationQuery {
    /// Only reservations for this room.
    #[serde(default)]
    pub room_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_password_target() {
        let req: SetPasswordRequest =
            serde_json::from_str(r#"{"userId":"u1","password":"x"}"#).unwrap();
        assert_eq!(req.target(), "u1");

        let req: SetPasswordRequest =
            serde_json::from_str(r#"{"identifier":"a@b.c","userId":"u1"}"#).unwrap();
        assert_eq!(req.target(), "a@b.c");

        let req: SetPasswordRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.target(), "");
    }

    #[test]
    fn test_absent_fields_deserialize() {
        let req: LoginRequest = serde_json::from_str("{}").unwrap();
        assert!(req.identifier.is_none());
        assert!(req.password.is_none());
    }
}
