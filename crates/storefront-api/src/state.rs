//! Application state

use std::sync::Arc;
use storefront_auth::{BasicAuthGuard, TokenAuthenticator};
use storefront_db::Database;

/// Prometheus render handle served at `/metrics`
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Which authentication variant this process serves
#[derive(Clone)]
pub enum AuthMode {
    /// Static credentials guarding the product listing
    Basic(Arc<BasicAuthGuard>),
    /// Token login with a role-gated user listing
    Jwt(Arc<TokenAuthenticator>),
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::Basic(_) => "basic",
            AuthMode::Jwt(_) => "jwt",
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub mode: AuthMode,
}

impl AppState {
    pub fn new(db: Database, mode: AuthMode) -> Self {
        Self { db, mode }
    }
}
