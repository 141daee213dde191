//! The seat reservation core.
//!
//! - `ledger`: held seats per showtime, derived from active reservations
//! - `guard`: per-showtime async mutex that owns the cached ledger
//! - `allocator`: validates and commits seat requests
//! - `cancellation`: releases seats of cancelled reservations
//! - `reconciler`: repairs cached ledgers that drifted from the store
//! - `service`: the facade used by the API layer

pub mod allocator;
pub mod cancellation;
pub mod guard;
pub mod ledger;
pub mod reconciler;
pub mod service;

pub use allocator::ReservationAllocator;
pub use cancellation::CancellationHandler;
pub use guard::{LedgerSlot, ShowtimeGuard, ShowtimeLock};
pub use ledger::{HeldSeats, SeatLedger};
pub use reconciler::{DisjointReport, LedgerReconciler, ReconcileReport};
pub use service::{ReservationService, SeatAvailability};
