//! Room reservations.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{CaredeskError, Result};

/// Highest valid weekday index (Saturday; Sunday is 0).
pub const MAX_WEEKDAY: u8 = 6;

/// Repeat pattern of a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Recurrence {
    /// A single absolute interval.
    #[default]
    None,
    /// Every listed weekday (0 = Sunday .. 6 = Saturday), reusing the
    /// time-of-day window of `start`/`end`.
    Weekly {
        /// Weekday indices.
        #[serde(default)]
        days: Vec<u8>,
    },
}

/// A booking of one room.
///
/// `start` and `end` are local wall-clock times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Reservation ID.
    #[serde(default)]
    pub id: String,
    /// Room being booked.
    #[serde(default)]
    pub room_id: String,
    /// Free-text label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Start of the (first) interval.
    pub start: NaiveDateTime,
    /// End of the (first) interval, exclusive.
    pub end: NaiveDateTime,
    /// Repeat pattern.
    #[serde(default)]
    pub recurrence: Recurrence,
}

impl Reservation {
    /// Create a one-off reservation.
    pub fn once(
        id: impl Into<String>,
        room_id: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            room_id: room_id.into(),
            title: None,
            start,
            end,
            recurrence: Recurrence::None,
        }
    }

    /// Create a weekly reservation on `days`.
    pub fn weekly(
        id: impl Into<String>,
        room_id: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        days: impl IntoIterator<Item = u8>,
    ) -> Self {
        Self {
            recurrence: Recurrence::Weekly {
                days: days.into_iter().collect(),
            },
            ..Self::once(id, room_id, start, end)
        }
    }

    /// Whether this reservation repeats.
    pub fn recurs(&self) -> bool {
        matches!(self.recurrence, Recurrence::Weekly { .. })
    }

    /// Weekdays this reservation occupies.
    ///
    /// A one-off reservation, or a weekly one with no days listed, occupies
    /// the weekday of its start.
    pub fn weekdays(&self) -> BTreeSet<u8> {
        let own = || BTreeSet::from([self.start.weekday().num_days_from_sunday() as u8]);
        match &self.recurrence {
            Recurrence::Weekly { days } if !days.is_empty() => days.iter().copied().collect(),
            _ => own(),
        }
    }

    /// Check the reservation is well formed before it is stored.
    pub fn validate(&self) -> Result<()> {
        if self.room_id.trim().is_empty() {
            return Err(CaredeskError::Missing("roomId"));
        }
        if self.start >= self.end {
            return Err(CaredeskError::InvalidReservation(
                "end must be after start".to_string(),
            ));
        }
        if let Recurrence::Weekly { days } = &self.recurrence {
            if let Some(day) = days.iter().find(|&&d| d > MAX_WEEKDAY) {
                return Err(CaredeskError::InvalidReservation(format!(
                    "weekday index {day} out of range 0..={MAX_WEEKDAY}"
                )));
            }
            if self.start.time() >= self.end.time() {
                return Err(CaredeskError::InvalidReservation(
                    "weekly reservations must end later on the same day".to_string(),
                ));
            }
        }
        Ok(())
    }
}
