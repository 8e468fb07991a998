//! Registration reporting over the accounts table.

use sqlx::PgPool;

use super::RepositoryError;

/// Read-only aggregation over account creation dates.
pub struct RegistrationReport<'a> {
    pool: &'a PgPool,
}

impl<'a> RegistrationReport<'a> {
    /// Create a new registration report.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Accounts created per calendar day for the last `days_back` days
    /// (today included), oldest day first. Days with no registrations
    /// produce a zero, so the result always has exactly `days_back`
    /// entries. A non-positive window returns an empty series without a
    /// round-trip.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn daily_registrations(
        &self,
        days_back: i32,
    ) -> Result<Vec<i64>, RepositoryError> {
        if days_back <= 0 {
            return Ok(Vec::new());
        }

        let counts: Vec<i64> = sqlx::query_scalar(
            "SELECT COUNT(a.id) \
             FROM generate_series(CURRENT_DATE - ($1 - 1), CURRENT_DATE, INTERVAL '1 day') AS day \
             LEFT JOIN accounts a ON a.created_at::date = day::date \
             GROUP BY day ORDER BY day",
        )
        .bind(days_back)
        .fetch_all(self.pool)
        .await?;
        Ok(counts)
    }
}
