//! Product category repository.

use std::collections::HashMap;

use sqlx::PgPool;

use mossberry_core::CategoryId;

use super::RepositoryError;
use crate::models::ProductCategory;

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    description: String,
}

impl From<CategoryRow> for ProductCategory {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            description: row.description,
        }
    }
}

/// Repository for product category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a category by ID. Absence is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<ProductCategory>, RepositoryError> {
        let row: Option<CategoryRow> =
            sqlx::query_as("SELECT id, name, description FROM product_categories WHERE id = $1")
                .bind(id.as_i32())
                .fetch_optional(self.pool)
                .await?;
        Ok(row.map(Into::into))
    }

    /// List all categories, name order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<ProductCategory>, RepositoryError> {
        let rows: Vec<CategoryRow> =
            sqlx::query_as("SELECT id, name, description FROM product_categories ORDER BY name")
                .fetch_all(self.pool)
                .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Create a category. The store assigns the ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        name: &str,
        description: &str,
    ) -> Result<ProductCategory, RepositoryError> {
        let row: CategoryRow = sqlx::query_as(
            "INSERT INTO product_categories (name, description) \
             VALUES ($1, $2) RETURNING id, name, description",
        )
        .bind(name)
        .bind(description)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "category insert failed");
            RepositoryError::Database(e)
        })?;
        Ok(row.into())
    }

    /// Overwrite a category's mutable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist,
    /// and `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: CategoryId,
        name: &str,
        description: &str,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE product_categories SET name = $2, description = $3 WHERE id = $1")
                .bind(id.as_i32())
                .bind(name)
                .bind(description)
                .execute(self.pool)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, category_id = %id, "category update failed");
                    RepositoryError::Database(e)
                })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a category. Products referencing it get their FK nulled by
    /// the store (`ON DELETE SET NULL`), no cascade.
    ///
    /// # Returns
    ///
    /// Returns `true` if the category was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product_categories WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, category_id = %id, "category delete failed");
                RepositoryError::Database(e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Batched lookup for page hydration: one fetch for a whole id set.
    pub(crate) async fn map_by_ids(
        &self,
        ids: &[i32],
    ) -> Result<HashMap<i32, ProductCategory>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<CategoryRow> =
            sqlx::query_as("SELECT id, name, description FROM product_categories WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(self.pool)
                .await?;
        Ok(rows.into_iter().map(|r| (r.id, r.into())).collect())
    }
}
