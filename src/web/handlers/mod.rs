//! API handlers.

pub mod admin;
pub mod auth;
pub mod reservation;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::auth::AuthService;
use crate::schedule::ReservationService;

pub use admin::*;
pub use auth::*;
pub use reservation::*;

/// Authentication service shared across handlers.
pub type SharedAuth = Arc<Mutex<AuthService>>;

/// Reservation service shared across handlers.
pub type SharedReservations = Arc<Mutex<ReservationService>>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Authentication service.
    pub auth: SharedAuth,
    /// Reservation service.
    pub reservations: SharedReservations,
}

impl AppState {
    /// Create a new application state.
    pub fn new(auth: AuthService, reservations: ReservationService) -> Self {
        Self {
            auth: Arc::new(Mutex::new(auth)),
            reservations: Arc::new(Mutex::new(reservations)),
        }
    }
}
