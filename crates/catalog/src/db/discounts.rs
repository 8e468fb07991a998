//! Discount repository.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;

use mossberry_core::DiscountId;

use super::RepositoryError;
use crate::models::Discount;

#[derive(Debug, sqlx::FromRow)]
struct DiscountRow {
    id: i32,
    name: String,
    description: String,
    discount_percent: Decimal,
    is_active: bool,
}

impl From<DiscountRow> for Discount {
    fn from(row: DiscountRow) -> Self {
        Self {
            id: DiscountId::new(row.id),
            name: row.name,
            description: row.description,
            discount_percent: row.discount_percent,
            is_active: row.is_active,
        }
    }
}

/// Repository for discount database operations.
pub struct DiscountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DiscountRepository<'a> {
    /// Create a new discount repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a discount by ID. Absence is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: DiscountId) -> Result<Option<Discount>, RepositoryError> {
        let row: Option<DiscountRow> = sqlx::query_as(
            "SELECT id, name, description, discount_percent, is_active \
             FROM discounts WHERE id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// List all discounts, highest percentage first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Discount>, RepositoryError> {
        let rows: Vec<DiscountRow> = sqlx::query_as(
            "SELECT id, name, description, discount_percent, is_active \
             FROM discounts ORDER BY discount_percent DESC, id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Create a discount. The store assigns the ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        name: &str,
        description: &str,
        discount_percent: Decimal,
        is_active: bool,
    ) -> Result<Discount, RepositoryError> {
        let row: DiscountRow = sqlx::query_as(
            "INSERT INTO discounts (name, description, discount_percent, is_active) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, name, description, discount_percent, is_active",
        )
        .bind(name)
        .bind(description)
        .bind(discount_percent)
        .bind(is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "discount insert failed");
            RepositoryError::Database(e)
        })?;
        Ok(row.into())
    }

    /// Overwrite a discount's mutable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the discount doesn't exist,
    /// and `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: DiscountId,
        name: &str,
        description: &str,
        discount_percent: Decimal,
        is_active: bool,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE discounts SET name = $2, description = $3, \
             discount_percent = $4, is_active = $5 WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(name)
        .bind(description)
        .bind(discount_percent)
        .bind(is_active)
        .execute(self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, discount_id = %id, "discount update failed");
            RepositoryError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a discount (`ON DELETE SET NULL` on products).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: DiscountId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM discounts WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, discount_id = %id, "discount delete failed");
                RepositoryError::Database(e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Batched lookup for page hydration.
    pub(crate) async fn map_by_ids(
        &self,
        ids: &[i32],
    ) -> Result<HashMap<i32, Discount>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<DiscountRow> = sqlx::query_as(
            "SELECT id, name, description, discount_percent, is_active \
             FROM discounts WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| (r.id, r.into())).collect())
    }
}
