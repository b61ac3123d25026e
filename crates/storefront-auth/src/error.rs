//! Authentication error types

use axum::http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use storefront_db::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing token value!")]
    MissingToken,

    #[error("Error in accessing the token: {0}")]
    Malformed(String),

    #[error("Error in accessing the token: Signature verification failed")]
    InvalidSignature,

    #[error("Error in accessing the token: Signature has expired")]
    Expired,

    #[error("Error in accessing the token: token subject no longer exists")]
    UnknownSubject,

    #[error("You are not authorize access this URL!")]
    Forbidden,

    #[error("Auth token is missing or invalid")]
    MissingCredentials,

    #[error("User cannot be verified")]
    InvalidCredentials,

    #[error("Unauthorized Access")]
    BasicAuthRequired,

    #[error("A protected route must allow at least one role")]
    EmptyRoleSet,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token signing error: {0}")]
    Signing(String),

    #[error("Credential store error: {0}")]
    Store(#[from] DbError),
}

impl AuthError {
    /// Short label used for logs and metrics
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::Malformed(_) => "malformed",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::Expired => "expired",
            AuthError::UnknownSubject => "unknown_subject",
            AuthError::Forbidden => "forbidden",
            AuthError::MissingCredentials => "missing_credentials",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::BasicAuthRequired => "basic_auth_required",
            AuthError::EmptyRoleSet => "empty_role_set",
            AuthError::PasswordHash(_) => "password_hash",
            AuthError::Signing(_) => "signing",
            AuthError::Store(_) => "store",
        }
    }

    /// HTTP status for this error
    ///
    /// Unauthenticated and unauthorized requests are both answered with 401.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::EmptyRoleSet
            | AuthError::PasswordHash(_)
            | AuthError::Signing(_)
            | AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn challenge(&self) -> Option<&'static str> {
        match self {
            AuthError::MissingCredentials => Some("Basic realm=\"Login required!\""),
            AuthError::BasicAuthRequired => Some("Basic realm=\"Authentication Required\""),
            _ => None,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            "Internal error".to_string()
        } else {
            self.to_string()
        };

        let mut response = (status, axum::Json(json!({ "message": message }))).into_response();
        if let Some(challenge) = self.challenge() {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static(challenge));
        }
        response
    }
}
