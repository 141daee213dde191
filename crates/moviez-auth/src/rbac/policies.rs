//! Role-to-permission mapping.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use moviez_entity::user::UserRole;

/// A system-level permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Book seats for oneself.
    ReservationCreate,
    /// Read and cancel one's own reservations.
    ReservationManageOwn,
    /// Read any user's reservations.
    ReservationViewAll,
    /// Cancel any user's reservation.
    ReservationCancelAny,
    /// Create, update and delete movies.
    MovieManage,
    /// Schedule and remove showtimes.
    ShowtimeManage,
    /// Trigger ledger reconciliation.
    LedgerReconcile,
}

/// Which permissions each role holds.
#[derive(Debug, Clone)]
pub struct RbacPolicies {
    policies: HashMap<UserRole, HashSet<Permission>>,
}

impl RbacPolicies {
    /// The default policy set.
    pub fn new() -> Self {
        let customer: HashSet<Permission> =
            [Permission::ReservationCreate, Permission::ReservationManageOwn]
                .into_iter()
                .collect();

        let mut admin = customer.clone();
        admin.extend([
            Permission::ReservationViewAll,
            Permission::ReservationCancelAny,
            Permission::MovieManage,
            Permission::ShowtimeManage,
            Permission::LedgerReconcile,
        ]);

        let mut policies = HashMap::new();
        policies.insert(UserRole::User, customer);
        policies.insert(UserRole::Admin, admin);
        Self { policies }
    }

    /// Whether `role` holds `permission`.
    pub fn has_permission(&self, role: &UserRole, permission: &Permission) -> bool {
        self.policies
            .get(role)
            .is_some_and(|set| set.contains(permission))
    }
}

impl Default for RbacPolicies {
    fn default() -> Self {
        Self::new()
    }
}
