//! caredesk - care-center administration backend.
//!
//! Password login with lockout, an optional one-time-code second factor,
//! password reset tokens and administrator overrides, plus conflict checks
//! for room reservations. Everything is persisted as JSON documents.

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod schedule;
pub mod store;
pub mod web;

pub use auth::{
    validate_password, AuthPolicy, AuthService, LoginOutcome, PasswordHasher, ResetOutcome,
    UserRecord,
};
pub use config::Config;
pub use error::{CaredeskError, Result};
pub use schedule::{Recurrence, Reservation, ReservationService};
pub use web::{AppState, WebServer};
