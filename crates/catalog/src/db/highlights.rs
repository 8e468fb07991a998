//! Highlight slot manager: the three positional featured-product slots.
//!
//! Slots are addressed by position 1-3 (unique at the store), each
//! optionally holding one product. A slot row that was never created and a
//! slot that was explicitly cleared are indistinguishable to callers - both
//! read back as empty.

use sqlx::PgPool;

use mossberry_core::ProductId;

use super::{ProductRepository, RepositoryError};
use crate::models::Product;

/// A validated highlight position, 1 through 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPosition(i32);

impl SlotPosition {
    /// Number of slots.
    pub const COUNT: usize = 3;

    /// Validate a raw position.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidPosition` outside 1..=3.
    pub const fn new(position: i32) -> Result<Self, RepositoryError> {
        if position >= 1 && position <= Self::COUNT as i32 {
            Ok(Self(position))
        } else {
            Err(RepositoryError::InvalidPosition(position))
        }
    }

    /// The raw position value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Zero-based index into the slot array (position 1 -> index 0).
    #[must_use]
    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

/// Result of a highlight upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightUpdate {
    /// The slot now points at the product.
    Applied,
    /// No such product; no slot row was created or changed.
    ProductNotFound,
}

#[derive(Debug, sqlx::FromRow)]
struct SlotRow {
    position: i32,
    product_id: Option<i32>,
}

/// Repository for the featured-product highlight slots.
pub struct HighlightRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> HighlightRepository<'a> {
    /// Create a new highlight repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Point a slot at a product, inserting or replacing the slot row.
    ///
    /// The position is validated before any store round-trip; the product
    /// must exist, otherwise [`HighlightUpdate::ProductNotFound`] comes back
    /// and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidPosition` for a position outside
    /// 1..=3, and `RepositoryError::Database` if a query fails.
    pub async fn set_highlight(
        &self,
        product_id: ProductId,
        position: i32,
    ) -> Result<HighlightUpdate, RepositoryError> {
        let position = SlotPosition::new(position)?;

        if !ProductRepository::new(self.pool).exists(product_id).await? {
            return Ok(HighlightUpdate::ProductNotFound);
        }

        sqlx::query(
            "INSERT INTO highlight_slots (position, product_id) VALUES ($1, $2) \
             ON CONFLICT (position) DO UPDATE SET product_id = EXCLUDED.product_id",
        )
        .bind(position.as_i32())
        .bind(product_id.as_i32())
        .execute(self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, position = position.as_i32(), "highlight upsert failed");
            RepositoryError::Database(e)
        })?;

        Ok(HighlightUpdate::Applied)
    }

    /// Empty a slot. The row is nulled, not deleted; clearing an empty or
    /// never-set slot is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidPosition` for a position outside
    /// 1..=3, and `RepositoryError::Database` if the query fails.
    pub async fn clear_highlight(&self, position: i32) -> Result<(), RepositoryError> {
        let position = SlotPosition::new(position)?;

        sqlx::query("UPDATE highlight_slots SET product_id = NULL WHERE position = $1")
            .bind(position.as_i32())
            .execute(self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, position = position.as_i32(), "highlight clear failed");
                RepositoryError::Database(e)
            })?;

        Ok(())
    }

    /// Read all three slots, index 0 = position 1. Positions without a row
    /// and cleared positions both come back as `None`; occupied slots carry
    /// the fully hydrated product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` if a stored product fails to map.
    pub async fn get_highlights(
        &self,
    ) -> Result<[Option<Product>; SlotPosition::COUNT], RepositoryError> {
        let rows: Vec<SlotRow> =
            sqlx::query_as("SELECT position, product_id FROM highlight_slots ORDER BY position")
                .fetch_all(self.pool)
                .await?;

        let products = ProductRepository::new(self.pool);
        let mut slots: [Option<Product>; SlotPosition::COUNT] = [None, None, None];

        for row in rows {
            let Ok(position) = SlotPosition::new(row.position) else {
                // Unique+check constraints make this unreachable; skip rather
                // than fail the whole read.
                continue;
            };
            if let Some(product_id) = row.product_id
                && let Some(slot) = slots.get_mut(position.index())
            {
                *slot = products.get(ProductId::new(product_id)).await?;
            }
        }

        Ok(slots)
    }
}
