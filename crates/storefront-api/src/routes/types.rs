//! Request/Response DTOs

use serde::{Deserialize, Deserializer, Serialize};
use storefront_db::User;

// ==================== Auth Types ====================

/// Login response
#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

// ==================== User Types ====================

/// Create user request
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub password: String,
    pub user_type: String,
}

/// User response (without password)
#[derive(Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub uuid: String,
    pub user_type: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            uuid: user.uuid,
            user_type: user.user_type,
        }
    }
}

// ==================== Product Types ====================

/// Create product request
#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub desc: Option<String>,
    pub price: f64,
    pub qty: i64,
}

/// Update product request (every field optional)
///
/// An explicit `"desc": null` clears the description; an absent key keeps it.
#[derive(Deserialize, Default)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub desc: Option<Option<String>>,
    pub price: Option<f64>,
    pub qty: Option<i64>,
}

/// Marks a key as present, keeping a JSON `null` as `Some(None)`
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
