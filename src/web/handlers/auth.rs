//! Authentication handlers.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::sync::Arc;

use super::AppState;
use crate::web::dto::{
    FirstLoginRequest, ForgotRequest, ForgotResponse, LoginRequest, LoginResponse, OkResponse,
    ResetRequest, VerifyOtpRequest, VerifyTokenRequest, VerifyTokenResponse,
};
use crate::web::error::ApiError;

/// POST /login - Check credentials.
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload?;
    let auth = state.auth.lock().await;
    let outcome = auth.login(
        req.identifier.as_deref().unwrap_or_default(),
        req.password.as_deref().unwrap_or_default(),
    )?;
    Ok(Json(outcome.into()))
}

/// POST /verify-otp - Complete a login with a one-time code.
pub async fn verify_otp(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(req) = payload?;
    let auth = state.auth.lock().await;
    auth.verify_otp(
        req.user_id.as_deref().unwrap_or_default(),
        req.code.as_deref().unwrap_or_default(),
    )?;
    Ok(Json(OkResponse::new()))
}

/// POST /verify-token - Check a reset token without consuming it.
pub async fn verify_token(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VerifyTokenRequest>, JsonRejection>,
) -> Result<Json<VerifyTokenResponse>, ApiError> {
    let Json(req) = payload?;
    let auth = state.auth.lock().await;
    let email = auth.verify_token(req.token.as_deref().unwrap_or_default())?;
    Ok(Json(VerifyTokenResponse { ok: true, email }))
}

/// POST /forgot - Issue a reset token.
pub async fn forgot(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ForgotRequest>, JsonRejection>,
) -> Result<Json<ForgotResponse>, ApiError> {
    let Json(req) = payload?;
    let auth = state.auth.lock().await;
    let outcome = auth.request_reset(req.email.as_deref().unwrap_or_default())?;
    Ok(Json(outcome.into()))
}

/// POST /reset - Set a new password with a reset token.
pub async fn reset(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ResetRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(req) = payload?;
    let auth = state.auth.lock().await;
    auth.reset(
        req.token.as_deref().unwrap_or_default(),
        req.password.as_deref().unwrap_or_default(),
    )?;
    Ok(Json(OkResponse::new()))
}

/// POST /first-login - Replace a temporary password.
pub async fn first_login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FirstLoginRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(req) = payload?;
    let auth = state.auth.lock().await;
    auth.first_login(
        req.user_id.as_deref().unwrap_or_default(),
        req.password.as_deref().unwrap_or_default(),
    )?;
    Ok(Json(OkResponse::new()))
}
