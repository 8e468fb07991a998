//! Blog post repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use mossberry_core::PostId;

use super::{RepositoryError, clamp_page};
use crate::models::{ImageCompromise, NewPost, Post, PostChanges};

const POST_COLUMNS: &str =
    "id, title, content, image_url, image_compromise, created_at, modified_at";

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: i32,
    title: String,
    content: String,
    image_url: String,
    image_compromise: String,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl TryFrom<PostRow> for Post {
    type Error = RepositoryError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let image_compromise = ImageCompromise::parse(&row.image_compromise)
            .map_err(|e| RepositoryError::DataCorruption(format!("post {}: {e}", row.id)))?;
        Ok(Self {
            id: PostId::new(row.id),
            title: row.title,
            content: row.content,
            image_url: row.image_url,
            image_compromise,
            created_at: row.created_at,
            modified_at: row.modified_at,
        })
    }
}

/// Repository for blog post database operations.
pub struct PostRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PostRepository<'a> {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a post by ID. Absence is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if the stored row fails to map.
    pub async fn get(&self, id: PostId) -> Result<Option<Post>, RepositoryError> {
        let row: Option<PostRow> =
            sqlx::query_as(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
                .bind(id.as_i32())
                .fetch_optional(self.pool)
                .await?;
        row.map(TryInto::try_into).transpose()
    }

    /// List a page of posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, start_index: i64, range: i64) -> Result<Vec<Post>, RepositoryError> {
        let Some((offset, limit)) = clamp_page(start_index, range) else {
            return Ok(Vec::new());
        };
        let rows: Vec<PostRow> = sqlx::query_as(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC, id DESC \
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Create a post. The store assigns the ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, post: &NewPost) -> Result<Post, RepositoryError> {
        let row: PostRow = sqlx::query_as(&format!(
            "INSERT INTO posts (title, content, image_url, image_compromise) \
             VALUES ($1, $2, $3, $4) RETURNING {POST_COLUMNS}"
        ))
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.image_url)
        .bind(post.image_compromise.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "post insert failed");
            RepositoryError::Database(e)
        })?;
        row.try_into()
    }

    /// Overwrite a post's mutable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post doesn't exist, and
    /// `RepositoryError::Database` for other database errors.
    pub async fn update(&self, id: PostId, changes: &PostChanges) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE posts SET title = $2, content = $3, image_url = $4, image_compromise = $5 \
             WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(&changes.image_url)
        .bind(changes.image_compromise.as_str())
        .execute(self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, post_id = %id, "post update failed");
            RepositoryError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a post.
    ///
    /// # Returns
    ///
    /// Returns `true` if the post was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: PostId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, post_id = %id, "post delete failed");
                RepositoryError::Database(e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
