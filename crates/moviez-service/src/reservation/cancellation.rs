//! Cancellation of reservations and release of their seats.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use moviez_auth::rbac::{Permission, RbacEnforcer};
use moviez_core::config::ReservationConfig;
use moviez_core::error::AppError;
use moviez_core::result::AppResult;
use moviez_core::types::ReservationId;
use moviez_database::{CatalogStore, ReservationStore};
use moviez_entity::reservation::{Reservation, ReservationStatus};

use super::guard::ShowtimeGuard;
use crate::context::RequestContext;

/// Moves reservations from `ACTIVE` to `CANCELLED`.
#[derive(Clone)]
pub struct CancellationHandler {
    catalog: Arc<dyn CatalogStore>,
    store: Arc<dyn ReservationStore>,
    guard: Arc<ShowtimeGuard>,
    rbac: Arc<RbacEnforcer>,
    lead: Duration,
}

impl std::fmt::Debug for CancellationHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationHandler")
            .field("lead", &self.lead)
            .finish()
    }
}

impl CancellationHandler {
    /// Creates a handler sharing `guard` with the allocator.
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        store: Arc<dyn ReservationStore>,
        guard: Arc<ShowtimeGuard>,
        rbac: Arc<RbacEnforcer>,
        config: &ReservationConfig,
    ) -> Self {
        Self {
            catalog,
            store,
            guard,
            rbac,
            lead: config.cancellation_lead(),
        }
    }

    /// Cancel a reservation on behalf of `ctx`.
    ///
    /// The requester must own the reservation or be an administrator, the
    /// reservation must be active, and the showtime must start later than
    /// the configured lead window. Administrators get no exemption from the
    /// window.
    pub async fn cancel(
        &self,
        reservation_id: ReservationId,
        ctx: &RequestContext,
    ) -> AppResult<Reservation> {
        let reservation = self.find(reservation_id).await?;

        self.rbac.require_owner_or(
            ctx.user_id,
            &ctx.role,
            reservation.user_id,
            &Permission::ReservationCancelAny,
        )?;

        ensure_active(&reservation)?;

        let showtime = self
            .catalog
            .find_showtime(reservation.showtime_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Showtime {} not found", reservation.showtime_id))
            })?;

        let now = Utc::now();
        if showtime.starts_within(now, self.lead) {
            return Err(AppError::invalid_state(format!(
                "Reservations cannot be cancelled within {} minutes of the showtime",
                self.lead.num_minutes()
            )));
        }

        let mut lock = self.guard.acquire(reservation.showtime_id).await?;

        // A concurrent cancel may have won while this one waited.
        let current = self.find(reservation_id).await?;
        ensure_active(&current)?;

        let updated = match self
            .store
            .update_status(reservation_id, ReservationStatus::Cancelled, now)
            .await
        {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                return Err(AppError::not_found(format!(
                    "Reservation {reservation_id} not found"
                )));
            }
            Err(e) => {
                lock.invalidate();
                warn!(
                    reservation_id = %reservation_id,
                    error = %e,
                    "Cancellation not committed; ledger cache invalidated"
                );
                return Err(e);
            }
        };

        lock.record_release(&updated.seat_numbers);
        info!(
            reservation_id = %reservation_id,
            showtime_id = %updated.showtime_id,
            cancelled_by = %ctx.user_id,
            seats = ?updated.seat_numbers,
            "Reservation cancelled"
        );

        Ok(updated)
    }

    async fn find(&self, reservation_id: ReservationId) -> AppResult<Reservation> {
        self.store
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Reservation {reservation_id} not found")))
    }
}

fn ensure_active(reservation: &Reservation) -> AppResult<()> {
    if reservation.is_active() {
        Ok(())
    } else {
        Err(AppError::invalid_state(format!(
            "Reservation {} is already {}",
            reservation.id, reservation.status
        )))
    }
}
