//! The seat ledger: which seats of a showtime are held by active
//! reservations.
//!
//! The ledger is derived from the reservation store. With caching enabled
//! the first access for a showtime hydrates a [`HeldSeats`] set inside the
//! showtime's guard slot, and later commits and cancellations update it in
//! place while the guard is held.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use moviez_core::result::AppResult;
use moviez_core::types::ShowtimeId;
use moviez_database::ReservationStore;
use moviez_entity::reservation::SeatNumber;

use super::guard::LedgerSlot;

/// Seats held for one showtime, kept in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeldSeats(BTreeSet<SeatNumber>);

impl HeldSeats {
    /// Union of the given seat sets.
    pub fn from_seat_sets<I, S>(sets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = SeatNumber>,
    {
        Self(sets.into_iter().flatten().collect())
    }

    /// Requested seats that are already held, ascending.
    pub fn conflicts(&self, requested: &[SeatNumber]) -> Vec<SeatNumber> {
        let mut taken: Vec<SeatNumber> = requested
            .iter()
            .copied()
            .filter(|seat| self.0.contains(seat))
            .collect();
        taken.sort_unstable();
        taken
    }

    /// Mark seats as held.
    pub fn hold(&mut self, seats: &[SeatNumber]) {
        self.0.extend(seats.iter().copied());
    }

    /// Mark seats as free.
    pub fn release(&mut self, seats: &[SeatNumber]) {
        for seat in seats {
            self.0.remove(seat);
        }
    }

    /// Whether `seat` is held.
    pub fn contains(&self, seat: SeatNumber) -> bool {
        self.0.contains(&seat)
    }

    /// Number of held seats.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no seat is held.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Held seats as an ascending vector.
    pub fn to_vec(&self) -> Vec<SeatNumber> {
        self.0.iter().copied().collect()
    }
}

/// Reads held seats from the store, optionally caching them per showtime.
#[derive(Clone)]
pub struct SeatLedger {
    store: Arc<dyn ReservationStore>,
    cache_enabled: bool,
}

impl std::fmt::Debug for SeatLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeatLedger")
            .field("cache_enabled", &self.cache_enabled)
            .finish()
    }
}

impl SeatLedger {
    /// Creates a ledger over `store`.
    pub fn new(store: Arc<dyn ReservationStore>, cache_enabled: bool) -> Self {
        Self {
            store,
            cache_enabled,
        }
    }

    /// Whether held seats are kept between calls.
    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    /// Recompute held seats from the store, bypassing any cache.
    pub async fn load(&self, showtime_id: ShowtimeId) -> AppResult<HeldSeats> {
        let sets = self.store.load_active_seat_sets(showtime_id).await?;
        let held = HeldSeats::from_seat_sets(sets);
        debug!(showtime_id = %showtime_id, held = held.len(), "Ledger loaded from store");
        Ok(held)
    }

    /// Held seats for the showtime whose guard slot is `slot`.
    ///
    /// The caller must hold the showtime guard. Hydrates the slot on first
    /// use, and on every call when caching is disabled.
    pub async fn current<'s>(
        &self,
        slot: &'s mut LedgerSlot,
        showtime_id: ShowtimeId,
    ) -> AppResult<&'s mut HeldSeats> {
        if !self.cache_enabled {
            slot.invalidate();
        }
        if slot.cached().is_none() {
            let fresh = self.load(showtime_id).await?;
            slot.replace(fresh);
        }
        Ok(slot.cached_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_of_sets() {
        let held = HeldSeats::from_seat_sets(vec![vec![25, 26], vec![3]]);
        assert_eq!(held.to_vec(), vec![3, 25, 26]);
        assert_eq!(held.len(), 3);
    }

    #[test]
    fn test_conflicts_are_sorted() {
        let held = HeldSeats::from_seat_sets(vec![vec![5, 9, 26]]);
        assert_eq!(held.conflicts(&[27, 26, 9, 1]), vec![9, 26]);
        assert!(held.conflicts(&[1, 2]).is_empty());
    }

    #[test]
    fn test_hold_and_release() {
        let mut held = HeldSeats::default();
        held.hold(&[1, 2, 3]);
        held.release(&[2]);
        assert!(held.contains(1));
        assert!(!held.contains(2));
        held.release(&[1, 3]);
        assert!(held.is_empty());
    }
}
