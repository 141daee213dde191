//! # moviez-auth
//!
//! Authentication and authorization for the Moviez backend.
//!
//! ## Modules
//!
//! - `jwt`: access token creation and validation
//! - `password`: Argon2id password hashing and policy checks
//! - `rbac`: role-to-permission policies and their enforcement

pub mod jwt;
pub mod password;
pub mod rbac;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordValidator};
pub use rbac::{Permission, RbacEnforcer, RbacPolicies};
