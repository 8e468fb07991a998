//! Account repository: the storage backend the identity framework plugs
//! into.
//!
//! Multi-step writes (account + profile) run in one transaction; a failure
//! anywhere rolls the whole write back. Write operations translate store
//! errors into [`IdentityFailure`]; reads propagate [`RepositoryError`]
//! and model absence as `Ok(None)`.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use mossberry_core::{AccountId, Email};

use super::{IdentityFailure, RepositoryError, clamp_page, escape_like};
use crate::models::{Account, UserProfile};

/// Columns selected for every account read, qualified with the `a` alias.
const ACCOUNT_COLUMNS: &str = "a.id, a.username, a.normalized_username, a.email, \
     a.normalized_email, a.email_confirmed, a.password_hash, a.security_stamp, \
     a.concurrency_stamp, a.phone_number, a.phone_confirmed, a.two_factor_enabled, \
     a.lockout_end, a.lockout_enabled, a.access_failed_count, a.created_at";

/// Internal row type for account queries.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    username: String,
    normalized_username: String,
    email: String,
    normalized_email: String,
    email_confirmed: bool,
    password_hash: Option<String>,
    security_stamp: String,
    concurrency_stamp: String,
    phone_number: Option<String>,
    phone_confirmed: bool,
    two_factor_enabled: bool,
    lockout_end: Option<DateTime<Utc>>,
    lockout_enabled: bool,
    access_failed_count: i32,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    first_name: String,
    last_name: String,
    telephone: String,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl From<ProfileRow> for UserProfile {
    fn from(row: ProfileRow) -> Self {
        Self {
            first_name: row.first_name,
            last_name: row.last_name,
            telephone: row.telephone,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

/// Repository for account database operations.
pub struct AccountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // -------------------------------------------------------------------
    // Account CRUD
    // -------------------------------------------------------------------

    /// Insert an account and its profile in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentityFailure`] with a duplicate code when a unique
    /// constraint (id, normalized username, normalized email) is violated,
    /// or `StorageFailure` for any other store error.
    pub async fn create(&self, account: &Account) -> Result<(), IdentityFailure> {
        let mut tx = self.pool.begin().await.map_err(|e| translate(&e))?;

        sqlx::query(
            "INSERT INTO accounts \
             (id, username, normalized_username, email, normalized_email, email_confirmed, \
              password_hash, security_stamp, concurrency_stamp, phone_number, phone_confirmed, \
              two_factor_enabled, lockout_end, lockout_enabled, access_failed_count, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
        )
        .bind(account.id.as_uuid())
        .bind(&account.username)
        .bind(&account.normalized_username)
        .bind(account.email.as_str())
        .bind(&account.normalized_email)
        .bind(account.email_confirmed)
        .bind(account.password_hash.as_deref())
        .bind(&account.security_stamp)
        .bind(&account.concurrency_stamp)
        .bind(account.phone_number.as_deref())
        .bind(account.phone_confirmed)
        .bind(account.two_factor_enabled)
        .bind(account.lockout_end)
        .bind(account.lockout_enabled)
        .bind(account.access_failed_count)
        .bind(account.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| translate(&e))?;

        sqlx::query(
            "INSERT INTO user_profiles (account_id, first_name, last_name, telephone) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(account.id.as_uuid())
        .bind(&account.profile.first_name)
        .bind(&account.profile.last_name)
        .bind(&account.profile.telephone)
        .execute(&mut *tx)
        .await
        .map_err(|e| translate(&e))?;

        tx.commit().await.map_err(|e| translate(&e))
    }

    /// Overwrite an account's mutable fields and upsert its profile, in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentityFailure`] translated from the store error.
    pub async fn update(&self, account: &Account) -> Result<(), IdentityFailure> {
        let mut tx = self.pool.begin().await.map_err(|e| translate(&e))?;

        sqlx::query(
            "UPDATE accounts SET \
             username = $2, normalized_username = $3, email = $4, normalized_email = $5, \
             email_confirmed = $6, password_hash = $7, security_stamp = $8, \
             concurrency_stamp = $9, phone_number = $10, phone_confirmed = $11, \
             two_factor_enabled = $12, lockout_end = $13, lockout_enabled = $14, \
             access_failed_count = $15 \
             WHERE id = $1",
        )
        .bind(account.id.as_uuid())
        .bind(&account.username)
        .bind(&account.normalized_username)
        .bind(account.email.as_str())
        .bind(&account.normalized_email)
        .bind(account.email_confirmed)
        .bind(account.password_hash.as_deref())
        .bind(&account.security_stamp)
        .bind(&account.concurrency_stamp)
        .bind(account.phone_number.as_deref())
        .bind(account.phone_confirmed)
        .bind(account.two_factor_enabled)
        .bind(account.lockout_end)
        .bind(account.lockout_enabled)
        .bind(account.access_failed_count)
        .execute(&mut *tx)
        .await
        .map_err(|e| translate(&e))?;

        sqlx::query(
            "INSERT INTO user_profiles (account_id, first_name, last_name, telephone) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (account_id) DO UPDATE SET \
             first_name = EXCLUDED.first_name, last_name = EXCLUDED.last_name, \
             telephone = EXCLUDED.telephone",
        )
        .bind(account.id.as_uuid())
        .bind(&account.profile.first_name)
        .bind(&account.profile.last_name)
        .bind(&account.profile.telephone)
        .execute(&mut *tx)
        .await
        .map_err(|e| translate(&e))?;

        tx.commit().await.map_err(|e| translate(&e))
    }

    /// Delete an account. Profile, memberships, claims, logins, and tokens
    /// go with it via store-level cascades. Deleting an absent account is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentityFailure`] translated from the store error.
    pub async fn delete(&self, id: AccountId) -> Result<(), IdentityFailure> {
        sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool)
            .await
            .map_err(|e| translate(&e))?;
        Ok(())
    }

    /// Find an account by id. Absence is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts a WHERE a.id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;
        self.hydrate(row).await
    }

    /// Find an account by normalized username. Absence is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Same as [`find_by_id`](Self::find_by_id).
    pub async fn find_by_username(
        &self,
        normalized_username: &str,
    ) -> Result<Option<Account>, RepositoryError> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts a WHERE a.normalized_username = $1"
        ))
        .bind(normalized_username)
        .fetch_optional(self.pool)
        .await?;
        self.hydrate(row).await
    }

    /// Find an account by normalized email. Absence is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Same as [`find_by_id`](Self::find_by_id).
    pub async fn find_by_email(
        &self,
        normalized_email: &str,
    ) -> Result<Option<Account>, RepositoryError> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts a WHERE a.normalized_email = $1"
        ))
        .bind(normalized_email)
        .fetch_optional(self.pool)
        .await?;
        self.hydrate(row).await
    }

    // -------------------------------------------------------------------
    // Credential accessors
    // -------------------------------------------------------------------

    /// The stored password hash; `Ok(None)` when the account is missing or
    /// has no password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn password_hash(&self, id: AccountId) -> Result<Option<String>, RepositoryError> {
        let hash: Option<Option<String>> =
            sqlx::query_scalar("SELECT password_hash FROM accounts WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(self.pool)
                .await?;
        Ok(hash.flatten())
    }

    /// Store (or clear, with `None`) the opaque password hash.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentityFailure`] translated from the store error.
    pub async fn set_password_hash(
        &self,
        id: AccountId,
        hash: Option<&str>,
    ) -> Result<(), IdentityFailure> {
        sqlx::query("UPDATE accounts SET password_hash = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(hash)
            .execute(self.pool)
            .await
            .map_err(|e| translate(&e))?;
        Ok(())
    }

    /// Whether a non-empty password hash is stored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_password(&self, id: AccountId) -> Result<bool, RepositoryError> {
        Ok(self
            .password_hash(id)
            .await?
            .is_some_and(|h| !h.is_empty()))
    }

    // -------------------------------------------------------------------
    // Email accessors
    // -------------------------------------------------------------------

    /// The stored email; `Ok(None)` when the account is missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn email(&self, id: AccountId) -> Result<Option<Email>, RepositoryError> {
        let email: Option<String> = sqlx::query_scalar("SELECT email FROM accounts WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(self.pool)
            .await?;
        email
            .map(|e| {
                Email::parse(&e).map_err(|err| {
                    RepositoryError::DataCorruption(format!("invalid email in database: {err}"))
                })
            })
            .transpose()
    }

    /// Store a new email; the normalized form is re-derived in the same
    /// statement so the two can never drift.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentityFailure`] translated from the store error
    /// (including `DuplicateEmail` on a normalized-email collision).
    pub async fn set_email(&self, id: AccountId, email: &Email) -> Result<(), IdentityFailure> {
        sqlx::query("UPDATE accounts SET email = $2, normalized_email = $3 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(email.as_str())
            .bind(email.normalized())
            .execute(self.pool)
            .await
            .map_err(|e| translate(&e))?;
        Ok(())
    }

    /// The email-confirmed flag; `Ok(None)` when the account is missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_confirmed(&self, id: AccountId) -> Result<Option<bool>, RepositoryError> {
        let confirmed: Option<bool> =
            sqlx::query_scalar("SELECT email_confirmed FROM accounts WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(self.pool)
                .await?;
        Ok(confirmed)
    }

    /// Set the email-confirmed flag.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentityFailure`] translated from the store error.
    pub async fn set_email_confirmed(
        &self,
        id: AccountId,
        confirmed: bool,
    ) -> Result<(), IdentityFailure> {
        sqlx::query("UPDATE accounts SET email_confirmed = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(confirmed)
            .execute(self.pool)
            .await
            .map_err(|e| translate(&e))?;
        Ok(())
    }

    // -------------------------------------------------------------------
    // Role membership
    // -------------------------------------------------------------------

    /// Add the account to a role, resolved by normalized role name. A
    /// no-op when the role doesn't exist or the membership is already
    /// present.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentityFailure`] translated from the store error.
    pub async fn add_to_role(
        &self,
        id: AccountId,
        normalized_role: &str,
    ) -> Result<(), IdentityFailure> {
        sqlx::query(
            "INSERT INTO account_roles (account_id, role_id) \
             SELECT $1, r.id FROM roles r WHERE r.normalized_name = $2 \
             ON CONFLICT DO NOTHING",
        )
        .bind(id.as_uuid())
        .bind(normalized_role)
        .execute(self.pool)
        .await
        .map_err(|e| translate(&e))?;
        Ok(())
    }

    /// Remove the account from a role. A no-op when the role doesn't exist
    /// or the account wasn't a member.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentityFailure`] translated from the store error.
    pub async fn remove_from_role(
        &self,
        id: AccountId,
        normalized_role: &str,
    ) -> Result<(), IdentityFailure> {
        sqlx::query(
            "DELETE FROM account_roles ar USING roles r \
             WHERE ar.role_id = r.id AND ar.account_id = $1 AND r.normalized_name = $2",
        )
        .bind(id.as_uuid())
        .bind(normalized_role)
        .execute(self.pool)
        .await
        .map_err(|e| translate(&e))?;
        Ok(())
    }

    /// Display names of the roles the account belongs to.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn roles_for(&self, id: AccountId) -> Result<Vec<String>, RepositoryError> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT r.name FROM roles r \
             INNER JOIN account_roles ar ON ar.role_id = r.id \
             WHERE ar.account_id = $1 ORDER BY r.name",
        )
        .bind(id.as_uuid())
        .fetch_all(self.pool)
        .await?;
        Ok(names)
    }

    /// All accounts in a role (by normalized role name), username order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` for an invalid stored email.
    pub async fn accounts_in_role(
        &self,
        normalized_role: &str,
    ) -> Result<Vec<Account>, RepositoryError> {
        let rows: Vec<AccountRow> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts a \
             INNER JOIN account_roles ar ON ar.account_id = a.id \
             INNER JOIN roles r ON r.id = ar.role_id \
             WHERE r.normalized_name = $1 ORDER BY a.username, a.id"
        ))
        .bind(normalized_role)
        .fetch_all(self.pool)
        .await?;
        self.attach_profiles(rows).await
    }

    /// Whether the account belongs to a role (by normalized role name).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_in_role(
        &self,
        id: AccountId,
        normalized_role: &str,
    ) -> Result<bool, RepositoryError> {
        let is_member: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM account_roles ar \
             INNER JOIN roles r ON r.id = ar.role_id \
             WHERE ar.account_id = $1 AND r.normalized_name = $2)",
        )
        .bind(id.as_uuid())
        .bind(normalized_role)
        .fetch_one(self.pool)
        .await?;
        Ok(is_member)
    }

    // -------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------

    /// Page through accounts matching an optional username keyword
    /// (case-insensitive substring) AND an optional role (exact normalized
    /// name). Same pagination clamping as the catalog engine.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` for an invalid stored email.
    pub async fn search(
        &self,
        keyword: Option<&str>,
        role: Option<&str>,
        start_index: i64,
        range: i64,
    ) -> Result<Vec<Account>, RepositoryError> {
        let Some((offset, limit)) = clamp_page(start_index, range) else {
            return Ok(Vec::new());
        };

        let mut builder = search_query(ACCOUNT_COLUMNS, keyword, role);
        builder.push(" ORDER BY a.username, a.id LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let rows: Vec<AccountRow> = builder.build_query_as().fetch_all(self.pool).await?;
        self.attach_profiles(rows).await
    }

    /// Total accounts matching the same predicate as
    /// [`search`](Self::search), without pagination.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_accounts(
        &self,
        keyword: Option<&str>,
        role: Option<&str>,
    ) -> Result<i64, RepositoryError> {
        let mut builder = search_query("COUNT(*)", keyword, role);
        let count: i64 = builder.build_query_scalar().fetch_one(self.pool).await?;
        Ok(count)
    }

    // -------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------

    async fn hydrate(&self, row: Option<AccountRow>) -> Result<Option<Account>, RepositoryError> {
        match row {
            Some(row) => {
                let profile = self.profile_for(row.id, row.created_at).await?;
                Ok(Some(to_account(row, profile)?))
            }
            None => Ok(None),
        }
    }

    /// Resolve the 1:1 profile; a missing row synthesizes an empty default
    /// rather than an absent result.
    async fn profile_for(
        &self,
        account_id: Uuid,
        fallback: DateTime<Utc>,
    ) -> Result<UserProfile, RepositoryError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            "SELECT first_name, last_name, telephone, created_at, modified_at \
             FROM user_profiles WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map_or_else(|| UserProfile::synthesized(fallback), Into::into))
    }

    async fn attach_profiles(
        &self,
        rows: Vec<AccountRow>,
    ) -> Result<Vec<Account>, RepositoryError> {
        let mut accounts = Vec::with_capacity(rows.len());
        for row in rows {
            let profile = self.profile_for(row.id, row.created_at).await?;
            accounts.push(to_account(row, profile)?);
        }
        Ok(accounts)
    }
}

/// Translate and trace a store error at the write boundary.
fn translate(error: &sqlx::Error) -> IdentityFailure {
    let failure = IdentityFailure::from_store(error);
    tracing::error!(error = %error, code = failure.code, "identity write failed");
    failure
}

fn to_account(row: AccountRow, profile: UserProfile) -> Result<Account, RepositoryError> {
    let email = Email::parse(&row.email).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
    })?;

    Ok(Account {
        id: AccountId::new(row.id),
        username: row.username,
        normalized_username: row.normalized_username,
        email,
        normalized_email: row.normalized_email,
        email_confirmed: row.email_confirmed,
        password_hash: row.password_hash,
        security_stamp: row.security_stamp,
        concurrency_stamp: row.concurrency_stamp,
        phone_number: row.phone_number,
        phone_confirmed: row.phone_confirmed,
        two_factor_enabled: row.two_factor_enabled,
        lockout_end: row.lockout_end,
        lockout_enabled: row.lockout_enabled,
        access_failed_count: row.access_failed_count,
        created_at: row.created_at,
        profile,
    })
}

/// Build the account search query: optional keyword and role filters
/// combine with AND.
fn search_query(
    select: &str,
    keyword: Option<&str>,
    role: Option<&str>,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {select} FROM accounts a"));

    if role.is_some() {
        builder.push(
            " INNER JOIN account_roles ar ON ar.account_id = a.id \
             INNER JOIN roles r ON r.id = ar.role_id",
        );
    }

    builder.push(" WHERE TRUE");

    if let Some(keyword) = keyword {
        builder.push(" AND a.username ILIKE ");
        builder.push_bind(format!("%{}%", escape_like(keyword)));
    }

    if let Some(role) = role {
        builder.push(" AND r.normalized_name = ");
        builder.push_bind(role.to_owned());
    }

    builder
}
