//! Database operations for the catalog `PostgreSQL` database.
//!
//! # Database: `mossberry_catalog`
//!
//! ## Tables
//!
//! - `products` - The catalog itself (nullable category/inventory/discount FKs)
//! - `product_categories`, `product_inventories`, `discounts` - Sub-records
//! - `highlight_slots` - The 3 positional featured-product slots (unique position)
//! - `posts` - Blog entries
//! - `visitor_sessions`, `visitor_page_views` - Visitor analytics
//! - `order_details`, `order_items`, `addresses`, `payments`, `payment_details`,
//!   `user_activity` - Order/sales schema (consumed by reporting joins)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/catalog/migrations/` and run via:
//! ```bash
//! cargo run -p mossberry-cli -- migrate catalog
//! ```

pub mod categories;
pub mod discounts;
pub mod highlights;
pub mod inventory;
pub mod posts;
pub mod products;
pub mod reporting;
pub mod visitors;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use categories::CategoryRepository;
pub use discounts::DiscountRepository;
pub use highlights::{HighlightRepository, HighlightUpdate, SlotPosition};
pub use inventory::InventoryRepository;
pub use posts::PostRepository;
pub use products::ProductRepository;
pub use reporting::ReportingRepository;
pub use visitors::VisitorRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate SKU).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A highlight position outside 1..=3. Raised before any store
    /// round-trip.
    #[error("invalid highlight position: {0} (must be 1-3)")]
    InvalidPosition(i32),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Clamp a caller-supplied pagination window.
///
/// Negative start indexes clamp to 0; a non-positive range yields `None`,
/// which callers treat as "empty page, skip the round-trip". Malformed
/// windows never reach the store.
#[must_use]
pub(crate) fn clamp_page(start_index: i64, range: i64) -> Option<(i64, i64)> {
    if range <= 0 {
        return None;
    }
    Some((start_index.max(0), range))
}

/// Escape `%`, `_`, and `\` in a keyword so an ILIKE pattern matches it as
/// a literal substring.
#[must_use]
pub(crate) fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_page_negative_start() {
        assert_eq!(clamp_page(-5, 10), Some((0, 10)));
        assert_eq!(clamp_page(0, 10), Some((0, 10)));
        assert_eq!(clamp_page(20, 10), Some((20, 10)));
    }

    #[test]
    fn test_clamp_page_rejects_empty_window() {
        assert_eq!(clamp_page(0, 0), None);
        assert_eq!(clamp_page(0, -1), None);
        assert_eq!(clamp_page(-3, -3), None);
    }

    #[test]
    fn test_escape_like_literals() {
        assert_eq!(escape_like("widget"), "widget");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }
}
