//! RBAC enforcement: permission checks and owner-or-admin capability checks.

use moviez_core::error::AppError;
use moviez_core::types::UserId;
use moviez_entity::user::UserRole;

use super::policies::{Permission, RbacPolicies};

/// Enforces role-based access control.
#[derive(Debug, Clone, Default)]
pub struct RbacEnforcer {
    policies: RbacPolicies,
}

impl RbacEnforcer {
    /// Creates an enforcer with the default policy set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with `Forbidden` unless `role` holds `permission`.
    pub fn require_permission(&self, role: &UserRole, permission: &Permission) -> Result<(), AppError> {
        if self.policies.has_permission(role, permission) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Role '{role}' does not have permission '{permission:?}'"
            )))
        }
    }

    /// Whether `role` holds `permission`.
    pub fn has_permission(&self, role: &UserRole, permission: &Permission) -> bool {
        self.policies.has_permission(role, permission)
    }

    /// Fails with `Forbidden` unless the actor owns the resource or holds
    /// the permission that covers everyone's resources.
    pub fn require_owner_or(
        &self,
        actor: UserId,
        role: &UserRole,
        owner: UserId,
        override_permission: &Permission,
    ) -> Result<(), AppError> {
        if actor == owner || self.has_permission(role, override_permission) {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "Only the owner or an administrator may access this reservation",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moviez_core::ErrorKind;

    #[test]
    fn test_user_cannot_manage_catalog() {
        let rbac = RbacEnforcer::new();
        let err = rbac
            .require_permission(&UserRole::User, &Permission::MovieManage)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
        assert!(rbac
            .require_permission(&UserRole::Admin, &Permission::MovieManage)
            .is_ok());
    }

    #[test]
    fn test_both_roles_can_reserve() {
        let rbac = RbacEnforcer::new();
        for role in [UserRole::User, UserRole::Admin] {
            assert!(rbac.has_permission(&role, &Permission::ReservationCreate));
        }
    }

    #[test]
    fn test_owner_or_admin() {
        let rbac = RbacEnforcer::new();
        let owner = UserId::new();
        let stranger = UserId::new();
        let perm = Permission::ReservationCancelAny;

        assert!(rbac.require_owner_or(owner, &UserRole::User, owner, &perm).is_ok());
        assert!(rbac.require_owner_or(stranger, &UserRole::Admin, owner, &perm).is_ok());
        let err = rbac
            .require_owner_or(stranger, &UserRole::User, owner, &perm)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }
}
