//! Product inventory repository.

use std::collections::HashMap;

use sqlx::PgPool;

use mossberry_core::InventoryId;

use super::RepositoryError;
use crate::models::ProductInventory;

#[derive(Debug, sqlx::FromRow)]
struct InventoryRow {
    id: i32,
    quantity: i32,
}

impl From<InventoryRow> for ProductInventory {
    fn from(row: InventoryRow) -> Self {
        Self {
            id: InventoryId::new(row.id),
            quantity: row.quantity,
        }
    }
}

/// Repository for product inventory database operations.
pub struct InventoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> InventoryRepository<'a> {
    /// Create a new inventory repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an inventory record by ID. Absence is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: InventoryId) -> Result<Option<ProductInventory>, RepositoryError> {
        let row: Option<InventoryRow> =
            sqlx::query_as("SELECT id, quantity FROM product_inventories WHERE id = $1")
                .bind(id.as_i32())
                .fetch_optional(self.pool)
                .await?;
        Ok(row.map(Into::into))
    }

    /// Create an inventory record with an initial quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, quantity: i32) -> Result<ProductInventory, RepositoryError> {
        let row: InventoryRow = sqlx::query_as(
            "INSERT INTO product_inventories (quantity) VALUES ($1) RETURNING id, quantity",
        )
        .bind(quantity)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "inventory insert failed");
            RepositoryError::Database(e)
        })?;
        Ok(row.into())
    }

    /// Overwrite the quantity on hand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the record doesn't exist,
    /// and `RepositoryError::Database` for other database errors.
    pub async fn update(&self, id: InventoryId, quantity: i32) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE product_inventories SET quantity = $2 WHERE id = $1")
            .bind(id.as_i32())
            .bind(quantity)
            .execute(self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, inventory_id = %id, "inventory update failed");
                RepositoryError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete an inventory record (`ON DELETE SET NULL` on products).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: InventoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product_inventories WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, inventory_id = %id, "inventory delete failed");
                RepositoryError::Database(e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Batched lookup for page hydration.
    pub(crate) async fn map_by_ids(
        &self,
        ids: &[i32],
    ) -> Result<HashMap<i32, ProductInventory>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<InventoryRow> =
            sqlx::query_as("SELECT id, quantity FROM product_inventories WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(self.pool)
                .await?;
        Ok(rows.into_iter().map(|r| (r.id, r.into())).collect())
    }
}
