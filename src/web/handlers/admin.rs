//! Admin API handlers.
//!
//! Routed behind the admin key guard when one is configured.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use std::sync::Arc;

use super::AppState;
use crate::auth::{UserPatch, UserSummary};
use crate::web::dto::{OkResponse, SetPasswordRequest};
use crate::web::error::ApiError;

/// POST /admin/set-password - Set a user's password.
pub async fn set_password(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SetPasswordRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(req) = payload?;
    let auth = state.auth.lock().await;
    auth.set_password(
        req.target(),
        req.password.as_deref().unwrap_or_default(),
        req.must_change_password,
    )?;
    Ok(Json(OkResponse::new()))
}

/// GET /admin/users - List all accounts.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let auth = state.auth.lock().await;
    Ok(Json(auth.list_users()?))
}

/// PATCH /admin/users/:id - Toggle the second factor or lift a lockout.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UserPatch>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(patch) = payload?;
    let auth = state.auth.lock().await;
    auth.patch_user(&id, &patch)?;
    Ok(Json(OkResponse::new()))
}
