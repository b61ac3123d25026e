//! API routes

mod health;
mod login;
pub mod metrics;
mod products;
pub mod types;
mod users;

use axum::Router;
use std::sync::Arc;
use storefront_auth::{AuthError, RoleSet, TokenGuard};

use crate::state::{AppState, AuthMode, MetricsHandle};

/// Roles allowed to list users
pub const USER_LIST_ROLES: [&str; 2] = ["user", "admin"];

/// Create the main router for the configured auth variant
///
/// Fails if a protected route is registered without any allowed role.
pub fn create_router(
    state: AppState,
    metrics_handle: Option<Arc<MetricsHandle>>,
) -> Result<Router, AuthError> {
    let mut router = Router::new().merge(health::routes());
    let mut stateless = Router::new();

    match &state.mode {
        AuthMode::Basic(guard) => {
            router = router.merge(products::routes(Some(guard.clone())));
        }
        AuthMode::Jwt(authenticator) => {
            let guard = TokenGuard::new(authenticator.clone(), RoleSet::new(USER_LIST_ROLES)?);
            router = router
                .merge(products::routes(None))
                .merge(users::routes(guard));
            stateless = stateless.merge(login::routes(authenticator.clone()));
        }
    }

    let mut router = router.with_state(state).merge(stateless);

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    Ok(router)
}
