//! Storefront Authentication and Authorization
//!
//! This crate provides the two request guards used by the storefront
//! services: a static HTTP Basic credential check, and JWT login with
//! per-route role gating.

pub mod basic;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod roles;
pub mod store;

pub use basic::{BasicAuthGuard, parse_basic_header};
pub use error::AuthError;
pub use jwt::{Claims, JwtManager};
pub use middleware::{
    AuthUser, TOKEN_HEADER, TokenAuthenticator, TokenGuard, basic_credentials,
    require_basic_auth, require_token,
};
pub use password::{hash_password, verify_password};
pub use roles::RoleSet;
pub use store::CredentialStore;
