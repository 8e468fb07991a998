//! Role repository.

use sqlx::PgPool;
use uuid::Uuid;

use mossberry_core::RoleId;

use super::{IdentityFailure, RepositoryError};
use crate::models::Role;

#[derive(Debug, sqlx::FromRow)]
struct RoleRow {
    id: Uuid,
    name: String,
    normalized_name: String,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Self {
            id: RoleId::new(row.id),
            name: row.name,
            normalized_name: row.normalized_name,
        }
    }
}

/// Repository for role database operations.
pub struct RoleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RoleRepository<'a> {
    /// Create a new role repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a role.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentityFailure`] translated from the store error
    /// (duplicate normalized names surface as `StorageFailure`).
    pub async fn create(&self, role: &Role) -> Result<(), IdentityFailure> {
        sqlx::query("INSERT INTO roles (id, name, normalized_name) VALUES ($1, $2, $3)")
            .bind(role.id.as_uuid())
            .bind(&role.name)
            .bind(&role.normalized_name)
            .execute(self.pool)
            .await
            .map_err(|e| {
                let failure = IdentityFailure::from_store(&e);
                tracing::error!(error = %e, code = failure.code, "role write failed");
                failure
            })?;
        Ok(())
    }

    /// Look a role up by its normalized name. Absence is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_normalized_name(
        &self,
        normalized_name: &str,
    ) -> Result<Option<Role>, RepositoryError> {
        let row: Option<RoleRow> = sqlx::query_as(
            "SELECT id, name, normalized_name FROM roles WHERE normalized_name = $1",
        )
        .bind(normalized_name)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// All roles, name order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Role>, RepositoryError> {
        let rows: Vec<RoleRow> =
            sqlx::query_as("SELECT id, name, normalized_name FROM roles ORDER BY name")
                .fetch_all(self.pool)
                .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Delete a role; memberships cascade with it. Deleting an absent role
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentityFailure`] translated from the store error.
    pub async fn delete(&self, id: RoleId) -> Result<(), IdentityFailure> {
        sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool)
            .await
            .map_err(|e| IdentityFailure::from_store(&e))?;
        Ok(())
    }
}
