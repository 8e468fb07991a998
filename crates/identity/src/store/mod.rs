//! Database operations for the identity `PostgreSQL` database.
//!
//! # Database: `mossberry_identity` (SEPARATE from catalog)
//!
//! ## Tables
//!
//! - `accounts` - The identity framework's user records
//! - `user_profiles` - 1:1 profile rows (cascade-deleted with the account)
//! - `roles`, `account_roles` - Roles and memberships
//! - `account_claims`, `account_logins`, `account_tokens` - Framework
//!   storage schema; no operations implemented here
//!
//! # Migrations
//!
//! Migrations are stored in `crates/identity/migrations/` and run via:
//! ```bash
//! cargo run -p mossberry-cli -- migrate identity
//! ```

pub mod accounts;
pub mod reporting;
pub mod roles;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use accounts::AccountRepository;
pub use reporting::RegistrationReport;
pub use roles::RoleRepository;

/// Errors for read operations; these propagate to the caller unfiltered.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// The structured failure result the identity framework expects from write
/// operations: an error code plus a human-readable description, instead of
/// an opaque store fault.
#[derive(Debug, Clone, Error)]
#[error("{code}: {description}")]
pub struct IdentityFailure {
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Human-readable description.
    pub description: String,
}

impl IdentityFailure {
    /// Failure code for a duplicate account id.
    pub const DUPLICATE_ACCOUNT_ID: &'static str = "DuplicateAccountId";
    /// Failure code for a duplicate (normalized) username.
    pub const DUPLICATE_USERNAME: &'static str = "DuplicateUserName";
    /// Failure code for a duplicate (normalized) email.
    pub const DUPLICATE_EMAIL: &'static str = "DuplicateEmail";
    /// Catch-all failure code for other store errors.
    pub const STORAGE_FAILURE: &'static str = "StorageFailure";

    /// Translate a store error into the framework's failure shape,
    /// classifying unique violations by the constraint they hit.
    #[must_use]
    pub fn from_store(error: &sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = error
            && db_err.is_unique_violation()
        {
            let code = match db_err.constraint() {
                Some("accounts_pkey") => Self::DUPLICATE_ACCOUNT_ID,
                Some("accounts_normalized_username_key") => Self::DUPLICATE_USERNAME,
                Some("accounts_normalized_email_key") => Self::DUPLICATE_EMAIL,
                _ => Self::STORAGE_FAILURE,
            };
            return Self {
                code,
                description: db_err.message().to_owned(),
            };
        }
        Self {
            code: Self::STORAGE_FAILURE,
            description: error.to_string(),
        }
    }
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

/// Clamp a caller-supplied pagination window; mirrors the catalog engine's
/// handling (negative start to 0, empty window skips the round-trip).
#[must_use]
pub(crate) fn clamp_page(start_index: i64, range: i64) -> Option<(i64, i64)> {
    if range <= 0 {
        return None;
    }
    Some((start_index.max(0), range))
}

/// Escape `%`, `_`, and `\` so an ILIKE pattern matches literally.
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
    fn test_non_database_error_maps_to_storage_failure() {
        let failure = IdentityFailure::from_store(&sqlx::Error::PoolTimedOut);
        assert_eq!(failure.code, IdentityFailure::STORAGE_FAILURE);
        assert!(!failure.description.is_empty());
    }

    #[test]
    fn test_clamp_page_mirrors_catalog() {
        assert_eq!(clamp_page(-1, 5), Some((0, 5)));
        assert_eq!(clamp_page(2, 0), None);
    }
}
