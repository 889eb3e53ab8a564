//! Router configuration for Web API.

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::dto::HealthResponse;
use super::handlers::{
    delete_reservation, first_login, forgot, list_reservations, list_users, login, reset,
    set_password, update_user, upsert_reservation, verify_otp, verify_token, AppState,
};
use super::middleware::{
    create_cors_layer, login_rate_limit, require_admin_key, AdminKey, RateLimitState,
};
use crate::config::WebConfig;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, config: &WebConfig) -> Router {
    let rate_limit_state = Arc::new(RateLimitState::from_config(config));
    create_router_with_limiter(app_state, config, rate_limit_state)
}

/// Create the main API router around an existing login limiter.
pub fn create_router_with_limiter(
    app_state: Arc<AppState>,
    config: &WebConfig,
    rate_limit_state: Arc<RateLimitState>,
) -> Router {
    let login_routes = Router::new()
        .route("/login", post(login))
        .route_layer(middleware::from_fn(move |req, next| {
            let state = rate_limit_state.clone();
            login_rate_limit(state, req, next)
        }));

    let auth_routes = Router::new()
        .route("/verify-otp", post(verify_otp))
        .route("/verify-token", post(verify_token))
        .route("/forgot", post(forgot))
        .route("/reset", post(reset))
        .route("/first-login", post(first_login));

    let admin_key = AdminKey::new(&config.admin_key);
    if !admin_key.is_set() {
        tracing::warn!("web.admin_key is empty; admin routes are unguarded");
    }
    let admin_routes = Router::new()
        .route("/set-password", post(set_password))
        .route("/users", get(list_users))
        .route("/users/:id", patch(update_user))
        .route_layer(middleware::from_fn(move |req, next| {
            let key = admin_key.clone();
            require_admin_key(key, req, next)
        }));

    let reservation_routes = Router::new()
        .route(
            "/reservations",
            get(list_reservations).put(upsert_reservation),
        )
        .route("/reservations/:id", delete(delete_reservation));

    Router::new()
        .merge(login_routes)
        .merge(auth_routes)
        .nest("/admin", admin_routes)
        .merge(reservation_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(&config.cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
