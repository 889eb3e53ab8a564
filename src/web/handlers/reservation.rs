//! Reservation handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use std::sync::Arc;

use super::AppState;
use crate::schedule::Reservation;
use crate::web::dto::ReservationQuery;
use crate::web::error::ApiError;

/// GET /reservations - List reservations, optionally for one room.
pub async fn list_reservations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReservationQuery>,
) -> Result<Json<Vec<Reservation>>, ApiError> {
    let reservations = state.reservations.lock().await;
    Ok(Json(reservations.list(query.room_id.as_deref())?))
}

/// PUT /reservations - Create or replace a reservation.
pub async fn upsert_reservation(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Reservation>, JsonRejection>,
) -> Result<Json<Reservation>, ApiError> {
    let Json(candidate) = payload.map_err(ApiError::reservation_body)?;
    let reservations = state.reservations.lock().await;
    Ok(Json(reservations.upsert(candidate)?))
}

/// DELETE /reservations/:id - Delete a reservation.
pub async fn delete_reservation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Reservation>, ApiError> {
    let reservations = state.reservations.lock().await;
    Ok(Json(reservations.remove(&id)?))
}
