//! Room reservation scheduling.
//!
//! Reservations are checked for overlaps with other bookings of the same
//! room before they are stored.

mod conflict;
mod reservation;
mod service;

pub use conflict::{find_conflict, has_conflict, overlap};
pub use reservation::{Recurrence, Reservation, MAX_WEEKDAY};
pub use service::ReservationService;
