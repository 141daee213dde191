//! Seat reservation configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for the allocator, cancellation handler and showtime guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationConfig {
    /// Capacity assigned to new showtimes that do not specify one.
    #[serde(default = "default_capacity")]
    pub default_capacity: i32,
    /// Upper bound on seats in a single reservation request.
    #[serde(default = "default_max_seats")]
    pub max_seats_per_request: usize,
    /// Maximum wait for the per-showtime guard before failing with `Busy`.
    #[serde(default = "default_guard_timeout")]
    pub guard_timeout_ms: u64,
    /// Cancellation is refused this many minutes before the showtime starts.
    #[serde(default = "default_lead_minutes")]
    pub cancellation_lead_minutes: i64,
    /// Keep held seats in memory between calls instead of recomputing.
    #[serde(default = "default_true")]
    pub cache_ledger: bool,
}

impl ReservationConfig {
    /// Guard timeout as a [`Duration`].
    pub fn guard_timeout(&self) -> Duration {
        Duration::from_millis(self.guard_timeout_ms)
    }

    /// Cancellation lead window as a chrono duration.
    pub fn cancellation_lead(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.cancellation_lead_minutes)
    }
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            default_capacity: default_capacity(),
            max_seats_per_request: default_max_seats(),
            guard_timeout_ms: default_guard_timeout(),
            cancellation_lead_minutes: default_lead_minutes(),
            cache_ledger: true,
        }
    }
}

fn default_capacity() -> i32 {
    100
}

fn default_max_seats() -> usize {
    10
}

fn default_guard_timeout() -> u64 {
    2000
}

fn default_lead_minutes() -> i64 {
    60
}

fn default_true() -> bool {
    true
}
