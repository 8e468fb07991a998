//! Daily reporting aggregators for sales and visitors.
//!
//! Each report generates the trailing `days_back`-day date series store-side
//! and LEFT JOINs the transactional table against it, so days with no
//! activity report zero and the result always has exactly `days_back`
//! values, oldest day first.

use rust_decimal::Decimal;
use sqlx::PgPool;

use super::RepositoryError;

/// Repository for daily sales/visitor reports.
pub struct ReportingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReportingRepository<'a> {
    /// Create a new reporting repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Total order value per day over the trailing `days_back` days,
    /// oldest to newest. Non-positive `days_back` yields an empty series
    /// without a store round-trip.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn daily_sales(&self, days_back: i32) -> Result<Vec<Decimal>, RepositoryError> {
        if days_back <= 0 {
            return Ok(Vec::new());
        }
        let totals: Vec<Decimal> = sqlx::query_scalar(
            "SELECT COALESCE(SUM(o.total), 0) \
             FROM generate_series(CURRENT_DATE - ($1 - 1), CURRENT_DATE, INTERVAL '1 day') AS day \
             LEFT JOIN order_details o ON o.created_at::date = day::date \
             GROUP BY day ORDER BY day",
        )
        .bind(days_back)
        .fetch_all(self.pool)
        .await?;
        Ok(totals)
    }

    /// Visitor session count per day over the trailing `days_back` days,
    /// oldest to newest. Non-positive `days_back` yields an empty series.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn daily_visitors(&self, days_back: i32) -> Result<Vec<i64>, RepositoryError> {
        if days_back <= 0 {
            return Ok(Vec::new());
        }
        let counts: Vec<i64> = sqlx::query_scalar(
            "SELECT COUNT(v.id) \
             FROM generate_series(CURRENT_DATE - ($1 - 1), CURRENT_DATE, INTERVAL '1 day') AS day \
             LEFT JOIN visitor_sessions v ON v.started_at::date = day::date \
             GROUP BY day ORDER BY day",
        )
        .bind(days_back)
        .fetch_all(self.pool)
        .await?;
        Ok(counts)
    }
}
