//! Storefront REST API
//!
//! This crate provides the Axum-based HTTP API for the storefront services:
//! product CRUD plus either a Basic-auth guard or JWT login with role-gated
//! user listing.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, AuthMode, MetricsHandle};
