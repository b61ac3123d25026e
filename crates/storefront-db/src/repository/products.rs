//! Product operations

use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewProduct, Product, UpdateProduct};
use crate::repository::Database;

impl Database {
    // ==================== Product Operations ====================

    /// Insert a new product
    pub async fn insert_product(&self, product: NewProduct) -> Result<Product, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO products (name, description, price, qty)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&product.name)
        .bind(&product.desc)
        .bind(product.price)
        .bind(product.qty)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DbError::from_write(e, format!("Product '{}' already exists", product.name))
        })?;

        let id: i64 = result.get("id");

        Ok(Product {
            id,
            name: product.name,
            desc: product.desc,
            price: product.price,
            qty: product.qty,
        })
    }

    /// Get a product by ID
    pub async fn get_product(&self, id: i64) -> Result<Option<Product>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, description, price, qty
            FROM products
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Product::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List all products
    pub async fn list_products(&self) -> Result<Vec<Product>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, price, qty
            FROM products
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Product::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Apply a partial update, returning the stored product
    pub async fn update_product(
        &self,
        id: i64,
        update: UpdateProduct,
    ) -> Result<Option<Product>, DbError> {
        let Some(mut product) = self.get_product(id).await? else {
            return Ok(None);
        };
        update.apply(&mut product);

        sqlx::query(
            r#"
            UPDATE products
            SET name = ?, description = ?, price = ?, qty = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.name)
        .bind(&product.desc)
        .bind(product.price)
        .bind(product.qty)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DbError::from_write(e, format!("Product '{}' already exists", product.name))
        })?;

        Ok(Some(product))
    }

    /// Delete a product, returning what was removed
    pub async fn delete_product(&self, id: i64) -> Result<Option<Product>, DbError> {
        let Some(product) = self.get_product(id).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(Some(product))
    }
}
