//! Overlap detection between reservations of the same room.
//!
//! Two one-off reservations conflict when their absolute intervals overlap.
//! When either side repeats weekly, they conflict when their weekday sets
//! intersect and their time-of-day windows overlap; the date part is
//! ignored. All intervals are half-open.

use super::reservation::Reservation;

fn overlaps<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && a_end > b_start
}

/// Whether two reservations occupy the room at the same time.
///
/// Room and id are not compared; see [`find_conflict`].
pub fn overlap(a: &Reservation, b: &Reservation) -> bool {
    if !a.recurs() && !b.recurs() {
        return overlaps(a.start, a.end, b.start, b.end);
    }

    if a.weekdays().is_disjoint(&b.weekdays()) {
        return false;
    }
    overlaps(a.start.time(), a.end.time(), b.start.time(), b.end.time())
}

/// First existing reservation that `candidate` would collide with.
///
/// Only reservations for the same room count, and the candidate's own id is
/// skipped so an edited reservation can be saved over itself.
pub fn find_conflict<'a, I>(candidate: &Reservation, existing: I) -> Option<&'a Reservation>
where
    I: IntoIterator<Item = &'a Reservation>,
{
    existing.into_iter().find(|other| {
        other.room_id == candidate.room_id && other.id != candidate.id && overlap(candidate, other)
    })
}

/// Whether `candidate` collides with any of `existing`.
pub fn has_conflict(candidate: &Reservation, existing: &[Reservation]) -> bool {
    find_conflict(candidate, existing).is_some()
}
