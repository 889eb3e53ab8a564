//! Reservation storage with conflict checks on write.

use std::sync::Arc;

use tracing::{info, warn};

use super::conflict::find_conflict;
use super::reservation::Reservation;
use crate::store::Repository;
use crate::{CaredeskError, Result};

/// Reservation service over a reservation repository.
pub struct ReservationService {
    store: Arc<dyn Repository<Reservation>>,
}

impl ReservationService {
    /// Create a new service.
    pub fn new(store: Arc<dyn Repository<Reservation>>) -> Self {
        Self { store }
    }

    /// Insert or replace a reservation.
    ///
    /// A reservation without an id gets a fresh one. Nothing is written if
    /// the reservation is malformed or overlaps another one in the same room.
    pub fn upsert(&self, mut candidate: Reservation) -> Result<Reservation> {
        candidate.validate()?;
        if candidate.id.trim().is_empty() {
            candidate.id = uuid::Uuid::new_v4().to_string();
        }

        let existing: Vec<Reservation> =
            self.store.list()?.into_iter().map(|(_, r)| r).collect();
        if let Some(other) = find_conflict(&candidate, &existing) {
            warn!(
                reservation_id = %candidate.id,
                room_id = %candidate.room_id,
                conflicts_with = %other.id,
                "Reservation rejected: room already booked"
            );
            return Err(CaredeskError::Conflict {
                with: other.id.clone(),
            });
        }

        self.store.put(&candidate.id, candidate.clone())?;
        info!(
            reservation_id = %candidate.id,
            room_id = %candidate.room_id,
            "Reservation saved"
        );
        Ok(candidate)
    }

    /// Delete a reservation.
    pub fn remove(&self, id: &str) -> Result<Reservation> {
        let removed = self
            .store
            .remove(id)?
            .ok_or_else(|| CaredeskError::NotFound("reservation".to_string()))?;
        info!(reservation_id = %id, "Reservation removed");
        Ok(removed)
    }

    /// Get a reservation by id.
    pub fn get(&self, id: &str) -> Result<Option<Reservation>> {
        self.store.get(id)
    }

    /// All reservations, optionally for one room, ordered by start.
    pub fn list(&self, room_id: Option<&str>) -> Result<Vec<Reservation>> {
        let mut reservations: Vec<Reservation> = self
            .store
            .list()?
            .into_iter()
            .map(|(_, r)| r)
            .filter(|r| room_id.map_or(true, |room| r.room_id == room))
            .collect();
        reservations.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        Ok(reservations)
    }
}
