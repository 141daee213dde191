//! Per-showtime mutual exclusion.
//!
//! Every showtime gets its own async mutex, created on first use. The mutex
//! also owns the showtime's cached [`HeldSeats`], so holding the guard is
//! the only way to read or change the cached ledger. Different showtimes
//! never contend.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use moviez_core::error::AppError;
use moviez_core::result::AppResult;
use moviez_core::types::ShowtimeId;
use moviez_entity::reservation::SeatNumber;

use super::ledger::HeldSeats;

/// State protected by a showtime's guard.
#[derive(Debug, Default)]
pub struct LedgerSlot {
    /// `None` until hydrated, or after invalidation.
    held: Option<HeldSeats>,
}

impl LedgerSlot {
    /// The cached held seats, if hydrated.
    pub fn cached(&self) -> Option<&HeldSeats> {
        self.held.as_ref()
    }

    /// Drop the cache so the next read re-hydrates from the store.
    pub fn invalidate(&mut self) {
        self.held = None;
    }

    /// Replace the cache with `held`.
    pub fn replace(&mut self, held: HeldSeats) {
        self.held = Some(held);
    }

    /// Record newly committed seats. No-op when not hydrated.
    pub fn record_hold(&mut self, seats: &[SeatNumber]) {
        if let Some(held) = self.held.as_mut() {
            held.hold(seats);
        }
    }

    /// Record released seats. No-op when not hydrated.
    pub fn record_release(&mut self, seats: &[SeatNumber]) {
        if let Some(held) = self.held.as_mut() {
            held.release(seats);
        }
    }

    pub(crate) fn cached_or_default(&mut self) -> &mut HeldSeats {
        self.held.get_or_insert_with(HeldSeats::default)
    }
}

/// Exclusive access to one showtime, released on drop.
pub type ShowtimeLock = OwnedMutexGuard<LedgerSlot>;

/// Keyed lock table serializing all ledger mutations per showtime.
#[derive(Debug)]
pub struct ShowtimeGuard {
    slots: DashMap<ShowtimeId, Arc<Mutex<LedgerSlot>>>,
    timeout: Duration,
}

impl ShowtimeGuard {
    /// Creates a guard whose acquisitions wait at most `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            slots: DashMap::new(),
            timeout,
        }
    }

    /// Acquire exclusive access to `showtime_id`.
    ///
    /// Fails with the retryable `Busy` error if the showtime stays locked
    /// longer than the configured timeout.
    pub async fn acquire(&self, showtime_id: ShowtimeId) -> AppResult<ShowtimeLock> {
        // Clone the Arc out so no map shard lock is held across the await.
        let slot = Arc::clone(self.slots.entry(showtime_id).or_default().value());

        match tokio::time::timeout(self.timeout, slot.lock_owned()).await {
            Ok(lock) => Ok(lock),
            Err(_) => {
                let waited_ms = self.timeout.as_millis() as u64;
                warn!(
                    showtime_id = %showtime_id,
                    waited_ms,
                    "Timed out waiting for showtime guard"
                );
                Err(AppError::busy(
                    format!("Showtime {showtime_id} is busy, please retry"),
                    waited_ms,
                ))
            }
        }
    }

    /// Showtimes that currently have a slot.
    pub fn showtime_ids(&self) -> Vec<ShowtimeId> {
        self.slots.iter().map(|entry| *entry.key()).collect()
    }

    /// Drop the slot of a showtime nobody is using, e.g. after deletion.
    pub fn forget(&self, showtime_id: ShowtimeId) {
        self.slots
            .remove_if(&showtime_id, |_, slot| Arc::strong_count(slot) == 1);
    }

    /// Remove slots that no task holds or waits on. Their cached ledgers
    /// are discarded and re-hydrated on next use. Returns how many were
    /// removed.
    pub fn prune_idle(&self) -> usize {
        let before = self.slots.len();
        self.slots
            .retain(|_, slot| Arc::strong_count(slot) > 1 || slot.try_lock().is_err());
        let removed = before.saturating_sub(self.slots.len());
        if removed > 0 {
            debug!(removed, remaining = self.slots.len(), "Pruned idle showtime guards");
        }
        removed
    }

    /// Number of showtimes with a slot.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no showtime has a slot.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moviez_core::ErrorKind;

    #[tokio::test]
    async fn test_second_acquire_times_out_busy() {
        let guard = ShowtimeGuard::new(Duration::from_millis(20));
        let show = ShowtimeId::new();

        let _held = guard.acquire(show).await.unwrap();
        let err = guard.acquire(show).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Busy);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_other_showtime_is_not_blocked() {
        let guard = ShowtimeGuard::new(Duration::from_millis(20));
        let _held = guard.acquire(ShowtimeId::new()).await.unwrap();
        assert!(guard.acquire(ShowtimeId::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_slot_state_survives_reacquire() {
        let guard = ShowtimeGuard::new(Duration::from_millis(20));
        let show = ShowtimeId::new();

        {
            let mut lock = guard.acquire(show).await.unwrap();
            lock.replace(HeldSeats::from_seat_sets(vec![vec![7]]));
        }
        let lock = guard.acquire(show).await.unwrap();
        assert_eq!(lock.cached().map(HeldSeats::to_vec), Some(vec![7]));
    }

    #[tokio::test]
    async fn test_prune_keeps_held_slots() {
        let guard = ShowtimeGuard::new(Duration::from_millis(20));
        let busy = ShowtimeId::new();
        let idle = ShowtimeId::new();

        let _held = guard.acquire(busy).await.unwrap();
        drop(guard.acquire(idle).await.unwrap());

        assert_eq!(guard.prune_idle(), 1);
        assert_eq!(guard.showtime_ids(), vec![busy]);
    }
}
