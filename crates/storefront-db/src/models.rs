//! Database models

use crate::utils::parse_datetime_or_now;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;

/// User model
///
/// `uuid` is the client-facing identifier carried in tokens; `id` never
/// leaves the service except in listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub user_type: String,
    pub created_at: DateTime<Utc>,
}

/// New user (for insertion)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub password_hash: String,
    pub user_type: String,
}

/// Product model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub desc: Option<String>,
    pub price: f64,
    pub qty: i64,
}

/// New product (for insertion)
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub desc: Option<String>,
    pub price: f64,
    pub qty: i64,
}

/// Update product (for partial updates)
///
/// `desc: Some(None)` clears the description.
#[derive(Debug, Clone, Default)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub desc: Option<Option<String>>,
    pub price: Option<f64>,
    pub qty: Option<i64>,
}

impl UpdateProduct {
    /// Apply the present fields on top of an existing product
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(desc) = self.desc {
            product.desc = desc;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(qty) = self.qty {
            product.qty = qty;
        }
    }
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&sqlx::sqlite::SqliteRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.try_get("id")?,
            uuid: row.try_get("uuid")?,
            name: row.try_get("name")?,
            password_hash: row.try_get("password_hash")?,
            user_type: row.try_get("user_type")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Product {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            desc: row.try_get("description")?,
            price: row.try_get("price")?,
            qty: row.try_get("qty")?,
        })
    }
}
