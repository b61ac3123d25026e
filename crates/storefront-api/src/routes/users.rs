//! User routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    middleware::from_fn_with_state,
    routing::{get, post},
};
use storefront_auth::{AuthUser, TokenGuard, hash_password, require_token};
use storefront_db::NewUser;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{CreateUserRequest, UserResponse};

// ==================== Input Validation ====================

/// Maximum allowed name length
const MAX_NAME_LENGTH: usize = 50;
/// Maximum allowed password length (prevent DoS with very large passwords)
const MAX_PASSWORD_LENGTH: usize = 256;
/// Maximum allowed role length
const MAX_USER_TYPE_LENGTH: usize = 10;

fn validate(request: &CreateUserRequest) -> Result<(), ApiError> {
    if request.name.is_empty() {
        return Err(ApiError::BadRequest("Name cannot be empty".to_string()));
    }
    if request.name.chars().count() > MAX_NAME_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Name exceeds maximum length of {} characters",
            MAX_NAME_LENGTH
        )));
    }
    if request.password.is_empty() {
        return Err(ApiError::BadRequest("Password cannot be empty".to_string()));
    }
    if request.password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    if request.user_type.is_empty() || request.user_type.chars().count() > MAX_USER_TYPE_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "user_type must be between 1 and {} characters",
            MAX_USER_TYPE_LENGTH
        )));
    }
    Ok(())
}

// ==================== User Routes ====================

/// POST /user
async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    validate(&request)?;

    debug!("Creating user: {}", request.name);

    let password_hash = hash_password(&request.password)?;

    let user = state
        .db
        .insert_user(NewUser {
            name: request.name,
            password_hash,
            user_type: request.user_type,
        })
        .await?;

    info!("Created user: {} ({})", user.name, user.uuid);
    Ok(Json(user.into()))
}

/// GET /user (token required)
async fn list_users(
    Extension(caller): Extension<AuthUser>,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    debug!("Listing users for {}", caller.name);

    let users = state.db.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /user/{uuid}
async fn get_user(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .db
        .get_user_by_uuid(&uuid)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {}", uuid)))?;

    Ok(Json(user.into()))
}

/// Create user routes; the listing runs behind `guard`
pub fn routes(guard: TokenGuard) -> Router<AppState> {
    let listing = Router::new()
        .route("/user", get(list_users))
        .route_layer(from_fn_with_state(guard, require_token));

    Router::new()
        .route("/user", post(create_user))
        .route("/user/{uuid}", get(get_user))
        .merge(listing)
}
