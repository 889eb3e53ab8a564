//! Response DTOs for Web API.

use serde::Serialize;

use crate::auth::{LoginOutcome, PublicUser, ResetOutcome};

/// Bare success body: `{"ok": true}`.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    /// Always true.
    pub ok: bool,
}

impl OkResponse {
    /// Success.
    pub fn new() -> Self {
        Self { ok: true }
    }
}

impl Default for OkResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Login response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Always true.
    pub ok: bool,
    /// A one-time code must be verified next.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mfa: Option<bool>,
    /// A new password must be set next.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_change_password: Option<bool>,
    /// User for the follow-up step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// The one-time code, in demo mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_code: Option<String>,
    /// Authenticated user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        let empty = Self {
            ok: true,
            mfa: None,
            must_change_password: None,
            user_id: None,
            demo_code: None,
            user: None,
        };
        match outcome {
            LoginOutcome::Challenge { user_id, demo_code } => Self {
                mfa: Some(true),
                user_id: Some(user_id),
                demo_code,
                ..empty
            },
            LoginOutcome::MustChangePassword { user_id } => Self {
                must_change_password: Some(true),
                user_id: Some(user_id),
                ..empty
            },
            LoginOutcome::Authenticated(user) => Self {
                user: Some(user),
                ..empty
            },
        }
    }
}

/// Reset token check response.
#[derive(Debug, Serialize)]
pub struct VerifyTokenResponse {
    /// Always true.
    pub ok: bool,
    /// Account the token belongs to.
    pub email: String,
}

/// Forgotten password response.
///
/// An unknown email yields `{"ok": false}` with a 200 status so the
/// response does not reveal whether the account exists.
#[derive(Debug, Serialize)]
pub struct ForgotResponse {
    /// Whether a token was issued.
    pub ok: bool,
    /// The token, in demo mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl From<ResetOutcome> for ForgotResponse {
    fn from(outcome: ResetOutcome) -> Self {
        match outcome {
            ResetOutcome::Issued { demo_token } => Self {
                ok: true,
                token: demo_token,
            },
            ResetOutcome::Unknown => Self {
                ok: false,
                token: None,
            },
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
}
