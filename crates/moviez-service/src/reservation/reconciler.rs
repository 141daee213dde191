//! Drift detection between cached ledgers and the reservation store.
//!
//! Drift means a cached ledger no longer equals the union of the stored
//! active seat sets, e.g. after another process wrote to the same
//! database. Reconciliation replaces the cache with the stored truth.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use moviez_core::result::AppResult;
use moviez_core::types::ShowtimeId;
use moviez_database::ReservationStore;
use moviez_entity::reservation::SeatNumber;

use super::guard::ShowtimeGuard;
use super::ledger::{HeldSeats, SeatLedger};

/// Outcome of reconciling one showtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// The showtime checked.
    pub showtime_id: ShowtimeId,
    /// Cached seats before reconciliation; `None` if nothing was cached.
    pub cached: Option<Vec<SeatNumber>>,
    /// Seats held according to the store.
    pub stored: Vec<SeatNumber>,
    /// Whether the cache disagreed with the store.
    pub drift: bool,
}

/// Result of checking that active reservations do not overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisjointReport {
    /// The showtime checked.
    pub showtime_id: ShowtimeId,
    /// Number of active reservations.
    pub active_reservations: usize,
    /// Seats claimed by more than one active reservation, ascending.
    pub duplicated: Vec<SeatNumber>,
}

impl DisjointReport {
    /// Whether every seat has at most one active holder.
    pub fn is_disjoint(&self) -> bool {
        self.duplicated.is_empty()
    }
}

/// Compares cached ledgers against the store and repairs them.
#[derive(Clone)]
pub struct LedgerReconciler {
    store: Arc<dyn ReservationStore>,
    ledger: SeatLedger,
    guard: Arc<ShowtimeGuard>,
}

impl std::fmt::Debug for LedgerReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerReconciler")
            .field("tracked_showtimes", &self.guard.len())
            .finish()
    }
}

impl LedgerReconciler {
    /// Creates a reconciler over the shared guard.
    pub fn new(
        store: Arc<dyn ReservationStore>,
        ledger: SeatLedger,
        guard: Arc<ShowtimeGuard>,
    ) -> Self {
        Self {
            store,
            ledger,
            guard,
        }
    }

    /// Reconcile one showtime under its guard.
    pub async fn reconcile(&self, showtime_id: ShowtimeId) -> AppResult<ReconcileReport> {
        let mut lock = self.guard.acquire(showtime_id).await?;

        let stored = self.ledger.load(showtime_id).await?;
        let cached = lock.cached().map(HeldSeats::to_vec);
        let drift = lock.cached().is_some_and(|held| *held != stored);

        if drift {
            warn!(
                showtime_id = %showtime_id,
                cached = ?cached,
                stored = ?stored.to_vec(),
                "Ledger drift detected, replacing cache with stored seats"
            );
        }

        let report = ReconcileReport {
            showtime_id,
            cached,
            stored: stored.to_vec(),
            drift,
        };

        if self.ledger.cache_enabled() {
            lock.replace(stored);
        } else {
            lock.invalidate();
        }

        Ok(report)
    }

    /// Reconcile every showtime that has a guard slot, then prune slots no
    /// task is using.
    pub async fn reconcile_all(&self) -> AppResult<Vec<ReconcileReport>> {
        let mut showtimes = self.guard.showtime_ids();
        showtimes.sort();

        let mut reports = Vec::with_capacity(showtimes.len());
        for showtime_id in showtimes {
            reports.push(self.reconcile(showtime_id).await?);
        }

        let drifted = reports.iter().filter(|r| r.drift).count();
        let pruned = self.guard.prune_idle();
        info!(
            checked = reports.len(),
            drifted,
            pruned,
            "Ledger reconciliation finished"
        );

        Ok(reports)
    }

    /// Check that no seat appears in two active reservations of a showtime.
    pub async fn verify_disjoint(&self, showtime_id: ShowtimeId) -> AppResult<DisjointReport> {
        let sets = self.store.load_active_seat_sets(showtime_id).await?;

        let mut holders: BTreeMap<SeatNumber, usize> = BTreeMap::new();
        for seat in sets.iter().flatten() {
            *holders.entry(*seat).or_default() += 1;
        }
        let duplicated: Vec<SeatNumber> = holders
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(seat, _)| seat)
            .collect();

        if !duplicated.is_empty() {
            warn!(
                showtime_id = %showtime_id,
                seats = ?duplicated,
                "Seats held by more than one active reservation"
            );
        }

        Ok(DisjointReport {
            showtime_id,
            active_reservations: sets.len(),
            duplicated,
        })
    }
}
