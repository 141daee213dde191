//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available to accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Regular customer: books and cancels own reservations.
    User,
    /// Manages the catalog and may act on any reservation.
    Admin,
}

impl UserRole {
    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Return the role as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = moviez_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(moviez_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: USER, ADMIN"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("USER".parse::<UserRole>().unwrap(), UserRole::User);
        assert!("manager".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_display_roundtrips_through_from_str() {
        for role in [UserRole::User, UserRole::Admin] {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), role);
        }
    }

    #[test]
    fn test_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"ADMIN\"");
    }
}
