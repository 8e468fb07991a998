//! Visitor session and page view repository.
//!
//! Sessions get a ~16 hour validity horizon at creation; page views attach
//! to a session and are only ever removed by the session's cascade.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use mossberry_core::{PageViewId, VisitorSessionId};

use super::RepositoryError;
use crate::models::{PageView, VisitorSession};

/// How long a visitor session stays valid after creation.
const SESSION_VALIDITY_HOURS: i64 = 16;

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
}

impl From<SessionRow> for VisitorSession {
    fn from(row: SessionRow) -> Self {
        Self {
            id: VisitorSessionId::new(row.id),
            started_at: row.started_at,
            ended_at: row.ended_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PageViewRow {
    id: i32,
    session_id: Uuid,
    url: String,
    viewed_at: DateTime<Utc>,
}

impl From<PageViewRow> for PageView {
    fn from(row: PageViewRow) -> Self {
        Self {
            id: PageViewId::new(row.id),
            session_id: VisitorSessionId::new(row.session_id),
            url: row.url,
            viewed_at: row.viewed_at,
        }
    }
}

/// Repository for visitor analytics database operations.
pub struct VisitorRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VisitorRepository<'a> {
    /// Create a new visitor repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Start a new session with a generated ID, valid for ~16 hours.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn start_session(&self) -> Result<VisitorSession, RepositoryError> {
        let id = VisitorSessionId::generate();
        let started_at = Utc::now();
        let ended_at = started_at + Duration::hours(SESSION_VALIDITY_HOURS);

        let row: SessionRow = sqlx::query_as(
            "INSERT INTO visitor_sessions (id, started_at, ended_at) \
             VALUES ($1, $2, $3) RETURNING id, started_at, ended_at",
        )
        .bind(id.as_uuid())
        .bind(started_at)
        .bind(ended_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "visitor session insert failed");
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    /// Find a session that is still valid. Unknown and expired sessions
    /// both come back as `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_valid(
        &self,
        id: VisitorSessionId,
    ) -> Result<Option<VisitorSession>, RepositoryError> {
        let row: Option<SessionRow> = sqlx::query_as(
            "SELECT id, started_at, ended_at FROM visitor_sessions \
             WHERE id = $1 AND ended_at > NOW()",
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Record a page view against a session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the session row is missing,
    /// and `RepositoryError::Database` for other database errors.
    pub async fn record_page_view(
        &self,
        session_id: VisitorSessionId,
        url: &str,
    ) -> Result<PageView, RepositoryError> {
        let row: PageViewRow = sqlx::query_as(
            "INSERT INTO visitor_page_views (session_id, url) \
             VALUES ($1, $2) RETURNING id, session_id, url, viewed_at",
        )
        .bind(session_id.as_uuid())
        .bind(url)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            tracing::error!(error = %e, "page view insert failed");
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    /// Number of page views recorded for a session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn page_view_count(
        &self,
        session_id: VisitorSessionId,
    ) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM visitor_page_views WHERE session_id = $1")
                .bind(session_id.as_uuid())
                .fetch_one(self.pool)
                .await?;
        Ok(count)
    }
}
