//! Reservation use cases exposed to the API layer.

use std::sync::Arc;

use serde::Serialize;

use moviez_auth::rbac::{Permission, RbacEnforcer};
use moviez_core::config::ReservationConfig;
use moviez_core::error::AppError;
use moviez_core::result::AppResult;
use moviez_core::types::{ReservationId, ShowtimeId};
use moviez_database::{CatalogStore, ReservationStore};
use moviez_entity::reservation::{Reservation, SeatNumber};

use super::allocator::ReservationAllocator;
use super::cancellation::CancellationHandler;
use super::guard::ShowtimeGuard;
use super::ledger::SeatLedger;
use super::reconciler::{DisjointReport, LedgerReconciler, ReconcileReport};
use crate::context::RequestContext;

/// Seat occupancy of a showtime.
#[derive(Debug, Clone, Serialize)]
pub struct SeatAvailability {
    /// The showtime.
    pub showtime_id: ShowtimeId,
    /// Total seats.
    pub capacity: i32,
    /// Held seats, ascending.
    pub held_seats: Vec<SeatNumber>,
    /// Seats still free.
    pub available: i32,
}

/// Facade over the allocator, cancellation handler, ledger and reconciler.
///
/// All components share one [`ShowtimeGuard`], so every ledger mutation
/// for a showtime is serialized no matter which use case performs it.
#[derive(Clone)]
pub struct ReservationService {
    catalog: Arc<dyn CatalogStore>,
    store: Arc<dyn ReservationStore>,
    rbac: Arc<RbacEnforcer>,
    guard: Arc<ShowtimeGuard>,
    ledger: SeatLedger,
    allocator: ReservationAllocator,
    cancellation: CancellationHandler,
    reconciler: LedgerReconciler,
}

impl std::fmt::Debug for ReservationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReservationService")
            .field("allocator", &self.allocator)
            .field("cancellation", &self.cancellation)
            .finish()
    }
}

impl ReservationService {
    /// Wires the reservation core from its stores and configuration.
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        store: Arc<dyn ReservationStore>,
        rbac: Arc<RbacEnforcer>,
        config: &ReservationConfig,
    ) -> Self {
        let guard = Arc::new(ShowtimeGuard::new(config.guard_timeout()));
        let ledger = SeatLedger::new(Arc::clone(&store), config.cache_ledger);

        let allocator = ReservationAllocator::new(
            Arc::clone(&catalog),
            Arc::clone(&store),
            ledger.clone(),
            Arc::clone(&guard),
            config,
        );
        let cancellation = CancellationHandler::new(
            Arc::clone(&catalog),
            Arc::clone(&store),
            Arc::clone(&guard),
            Arc::clone(&rbac),
            config,
        );
        let reconciler = LedgerReconciler::new(Arc::clone(&store), ledger.clone(), Arc::clone(&guard));

        Self {
            catalog,
            store,
            rbac,
            guard,
            ledger,
            allocator,
            cancellation,
            reconciler,
        }
    }

    /// The guard shared by every ledger writer.
    pub fn guard(&self) -> Arc<ShowtimeGuard> {
        Arc::clone(&self.guard)
    }

    /// Reserve seats for the calling user.
    pub async fn reserve(
        &self,
        ctx: &RequestContext,
        showtime_id: ShowtimeId,
        seats: Vec<SeatNumber>,
    ) -> AppResult<Reservation> {
        self.rbac
            .require_permission(&ctx.role, &Permission::ReservationCreate)?;
        self.allocator.reserve(showtime_id, ctx.user_id, seats).await
    }

    /// Cancel a reservation owned by the caller (or any, for admins).
    pub async fn cancel(
        &self,
        ctx: &RequestContext,
        reservation_id: ReservationId,
    ) -> AppResult<Reservation> {
        self.cancellation.cancel(reservation_id, ctx).await
    }

    /// A single reservation, visible to its owner and administrators.
    pub async fn get(
        &self,
        ctx: &RequestContext,
        reservation_id: ReservationId,
    ) -> AppResult<Reservation> {
        let reservation = self
            .store
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Reservation {reservation_id} not found")))?;

        self.rbac.require_owner_or(
            ctx.user_id,
            &ctx.role,
            reservation.user_id,
            &Permission::ReservationViewAll,
        )?;

        Ok(reservation)
    }

    /// The caller's reservations, newest first.
    pub async fn list_mine(&self, ctx: &RequestContext) -> AppResult<Vec<Reservation>> {
        self.store.find_by_user(ctx.user_id).await
    }

    /// Every reservation of a showtime (administrators only).
    pub async fn list_for_showtime(
        &self,
        ctx: &RequestContext,
        showtime_id: ShowtimeId,
    ) -> AppResult<Vec<Reservation>> {
        self.rbac
            .require_permission(&ctx.role, &Permission::ReservationViewAll)?;
        self.require_showtime(showtime_id).await?;
        self.store.find_by_showtime(showtime_id).await
    }

    /// Held seats of a showtime, read under its guard.
    pub async fn held_seats(&self, showtime_id: ShowtimeId) -> AppResult<Vec<SeatNumber>> {
        let mut lock = self.guard.acquire(showtime_id).await?;
        let held = self.ledger.current(&mut lock, showtime_id).await?;
        Ok(held.to_vec())
    }

    /// Capacity, held seats and free seat count of a showtime.
    pub async fn availability(&self, showtime_id: ShowtimeId) -> AppResult<SeatAvailability> {
        let showtime = self.require_showtime(showtime_id).await?;
        let held_seats = self.held_seats(showtime_id).await?;
        let available = (showtime.capacity - held_seats.len() as i32).max(0);

        Ok(SeatAvailability {
            showtime_id,
            capacity: showtime.capacity,
            held_seats,
            available,
        })
    }

    /// Reconcile one showtime, or every cached one (administrators only).
    pub async fn reconcile(
        &self,
        ctx: &RequestContext,
        showtime_id: Option<ShowtimeId>,
    ) -> AppResult<Vec<ReconcileReport>> {
        self.rbac
            .require_permission(&ctx.role, &Permission::LedgerReconcile)?;
        match showtime_id {
            Some(id) => Ok(vec![self.reconciler.reconcile(id).await?]),
            None => self.reconciler.reconcile_all().await,
        }
    }

    /// Check the no-double-booking invariant for a showtime.
    pub async fn verify_disjoint(&self, showtime_id: ShowtimeId) -> AppResult<DisjointReport> {
        self.reconciler.verify_disjoint(showtime_id).await
    }

    async fn require_showtime(
        &self,
        showtime_id: ShowtimeId,
    ) -> AppResult<moviez_entity::showtime::Showtime> {
        self.catalog
            .find_showtime(showtime_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Showtime {showtime_id} not found")))
    }
}
