//! Product routes

use axum::{
    Json, Router,
    extract::{Path, State},
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use storefront_auth::{BasicAuthGuard, require_basic_auth};
use storefront_db::{NewProduct, Product, UpdateProduct};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{CreateProductRequest, UpdateProductRequest};

// ==================== Input Validation ====================

/// Maximum allowed product name length
const MAX_NAME_LENGTH: usize = 50;
/// Maximum allowed description length
const MAX_DESC_LENGTH: usize = 100;

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::BadRequest("Product name cannot be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Product name exceeds maximum length of {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

fn validate_desc(desc: Option<&str>) -> Result<(), ApiError> {
    if desc.is_some_and(|d| d.chars().count() > MAX_DESC_LENGTH) {
        return Err(ApiError::BadRequest(format!(
            "Product description exceeds maximum length of {} characters",
            MAX_DESC_LENGTH
        )));
    }
    Ok(())
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Product not found: {}", id))
}

// ==================== Product Routes ====================

/// POST /product
async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<Json<Product>, ApiError> {
    validate_name(&request.name)?;
    validate_desc(request.desc.as_deref())?;

    let product = state
        .db
        .insert_product(NewProduct {
            name: request.name,
            desc: request.desc,
            price: request.price,
            qty: request.qty,
        })
        .await?;

    info!("Created product: {} ({})", product.name, product.id);
    Ok(Json(product))
}

/// GET /product
async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.db.list_products().await?))
}

/// GET /product/{id}
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, ApiError> {
    let product = state.db.get_product(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(product))
}

/// PUT /product/{id}
async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<Product>, ApiError> {
    if let Some(name) = &request.name {
        validate_name(name)?;
    }
    validate_desc(request.desc.as_ref().and_then(|d| d.as_deref()))?;

    debug!("Updating product: {}", id);

    let product = state
        .db
        .update_product(
            id,
            UpdateProduct {
                name: request.name,
                desc: request.desc,
                price: request.price,
                qty: request.qty,
            },
        )
        .await?
        .ok_or_else(|| not_found(id))?;

    info!("Updated product: {}", id);
    Ok(Json(product))
}

/// DELETE /product/{id}
async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, ApiError> {
    let product = state.db.delete_product(id).await?.ok_or_else(|| not_found(id))?;

    info!("Deleted product: {}", id);
    Ok(Json(product))
}

/// Create product routes
///
/// With a Basic guard only the listing is protected; creation, lookup,
/// update and deletion stay open in both variants.
pub fn routes(basic_guard: Option<Arc<BasicAuthGuard>>) -> Router<AppState> {
    let listing = Router::new().route("/product", get(list_products));
    let listing = match basic_guard {
        Some(guard) => listing.route_layer(from_fn_with_state(guard, require_basic_auth)),
        None => listing,
    };

    Router::new()
        .route("/product", post(create_product))
        .route(
            "/product/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .merge(listing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Laptop").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LENGTH)).is_ok());
        assert!(validate_name(&"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_desc() {
        assert!(validate_desc(None).is_ok());
        assert!(validate_desc(Some("")).is_ok());
        assert!(validate_desc(Some(&"d".repeat(MAX_DESC_LENGTH + 1))).is_err());
    }
}
