//! Token login route

use axum::{Json, Router, extract::State, http::HeaderMap, routing::post};
use chrono::Utc;
use std::sync::Arc;
use storefront_auth::{AuthError, TokenAuthenticator, basic_credentials};

use crate::error::ApiError;

use super::types::LoginResponse;

/// POST /login
///
/// Credentials arrive in an HTTP Basic authorization header.
async fn login(
    State(authenticator): State<Arc<TokenAuthenticator>>,
    headers: HeaderMap,
) -> Result<Json<LoginResponse>, ApiError> {
    let (username, password) =
        basic_credentials(&headers).ok_or(AuthError::MissingCredentials)?;

    match authenticator.login(&username, &password, Utc::now()).await {
        Ok(token) => {
            metrics::counter!("storefront_logins_total", "outcome" => "success").increment(1);
            Ok(Json(LoginResponse { token }))
        }
        Err(e) => {
            tracing::warn!("Login failed for {}: {}", username, e);
            metrics::counter!("storefront_logins_total", "outcome" => e.reason()).increment(1);
            Err(e.into())
        }
    }
}

/// Create login routes
pub fn routes(authenticator: Arc<TokenAuthenticator>) -> Router {
    Router::new()
        .route("/login", post(login))
        .with_state(authenticator)
}
