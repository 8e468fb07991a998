//! Account management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a passwordless account
//! mossberry account create -u ada -e ada@example.com
//!
//! # Create an account with a pre-computed hash and a role
//! mossberry account create -u ada -e ada@example.com -p '<hash>' -r admin
//! ```
//!
//! # Environment Variables
//!
//! - `IDENTITY_DATABASE_URL` - `PostgreSQL` connection string for identity

use secrecy::SecretString;
use thiserror::Error;

use mossberry_core::{Email, EmailError};
use mossberry_identity::models::Account;
use mossberry_identity::store::{self, AccountRepository, IdentityFailure, RepositoryError};

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The store rejected the write.
    #[error("Account write rejected: {0}")]
    Rejected(#[from] IdentityFailure),

    /// A read against the store failed.
    #[error("Store read failed: {0}")]
    Store(#[from] RepositoryError),
}

/// Create an account, optionally adding it to an existing role.
///
/// # Errors
///
/// Returns an [`AccountError`] if the environment is incomplete, the email
/// doesn't parse, or the store rejects the write.
pub async fn create(
    username: &str,
    email: &str,
    password_hash: Option<String>,
    role: Option<&str>,
) -> Result<(), AccountError> {
    dotenvy::dotenv().ok();

    let database_url: SecretString = std::env::var("IDENTITY_DATABASE_URL")
        .map_err(|_| AccountError::MissingEnvVar("IDENTITY_DATABASE_URL"))?
        .into();

    let email = Email::parse(email)?;
    let account = Account::new(username.to_owned(), email, password_hash);

    let pool = store::create_pool(&database_url).await?;
    let repo = AccountRepository::new(&pool);
    repo.create(&account).await?;
    tracing::info!(id = %account.id, username, "account created");

    if let Some(role) = role {
        repo.add_to_role(account.id, &role.to_uppercase()).await?;
        if repo.is_in_role(account.id, &role.to_uppercase()).await? {
            tracing::info!(role, "added to role");
        } else {
            tracing::warn!(role, "role does not exist; membership not added");
        }
    }

    Ok(())
}
