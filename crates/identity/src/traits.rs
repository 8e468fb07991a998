//! Narrow capability traits the identity framework consumes.
//!
//! Each trait covers one concern; [`AccountRepository`] implements all of
//! them by delegating to its inherent methods. Consumers that only check
//! passwords depend on [`CredentialStore`] alone instead of the whole
//! repository surface.

use mossberry_core::{AccountId, Email};

use crate::models::Account;
use crate::store::{AccountRepository, IdentityFailure, RepositoryError};

/// Account lifecycle and lookup.
pub trait AccountStore {
    /// Persist a new account and its profile.
    async fn create(&self, account: &Account) -> Result<(), IdentityFailure>;

    /// Overwrite an account and upsert its profile.
    async fn update(&self, account: &Account) -> Result<(), IdentityFailure>;

    /// Delete an account and everything hanging off it.
    async fn delete(&self, id: AccountId) -> Result<(), IdentityFailure>;

    /// Look an account up by id.
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError>;

    /// Look an account up by normalized username.
    async fn find_by_username(
        &self,
        normalized_username: &str,
    ) -> Result<Option<Account>, RepositoryError>;

    /// Look an account up by normalized email.
    async fn find_by_email(
        &self,
        normalized_email: &str,
    ) -> Result<Option<Account>, RepositoryError>;
}

/// Password-hash storage. The hash is opaque here; hashing and
/// verification live in the framework.
pub trait CredentialStore {
    /// The stored hash, if any.
    async fn password_hash(&self, id: AccountId) -> Result<Option<String>, RepositoryError>;

    /// Store or clear the hash.
    async fn set_password_hash(
        &self,
        id: AccountId,
        hash: Option<&str>,
    ) -> Result<(), IdentityFailure>;

    /// Whether a non-empty hash is stored.
    async fn has_password(&self, id: AccountId) -> Result<bool, RepositoryError>;
}

/// Email storage and lookup.
pub trait EmailStore {
    /// The stored email, if the account exists.
    async fn email(&self, id: AccountId) -> Result<Option<Email>, RepositoryError>;

    /// Store a new email, re-deriving the normalized form.
    async fn set_email(&self, id: AccountId, email: &Email) -> Result<(), IdentityFailure>;

    /// The confirmed flag, if the account exists.
    async fn email_confirmed(&self, id: AccountId) -> Result<Option<bool>, RepositoryError>;

    /// Set the confirmed flag.
    async fn set_email_confirmed(
        &self,
        id: AccountId,
        confirmed: bool,
    ) -> Result<(), IdentityFailure>;
}

/// Role membership, addressed by normalized role name.
pub trait RoleMembershipStore {
    /// Add the account to a role; a no-op for unknown roles.
    async fn add_to_role(
        &self,
        id: AccountId,
        normalized_role: &str,
    ) -> Result<(), IdentityFailure>;

    /// Remove the account from a role; a no-op for unknown roles.
    async fn remove_from_role(
        &self,
        id: AccountId,
        normalized_role: &str,
    ) -> Result<(), IdentityFailure>;

    /// Role display names the account belongs to.
    async fn roles_for(&self, id: AccountId) -> Result<Vec<String>, RepositoryError>;

    /// All accounts in a role.
    async fn accounts_in_role(
        &self,
        normalized_role: &str,
    ) -> Result<Vec<Account>, RepositoryError>;

    /// Whether the account belongs to a role.
    async fn is_in_role(
        &self,
        id: AccountId,
        normalized_role: &str,
    ) -> Result<bool, RepositoryError>;
}

impl AccountStore for AccountRepository<'_> {
    async fn create(&self, account: &Account) -> Result<(), IdentityFailure> {
        Self::create(self, account).await
    }

    async fn update(&self, account: &Account) -> Result<(), IdentityFailure> {
        Self::update(self, account).await
    }

    async fn delete(&self, id: AccountId) -> Result<(), IdentityFailure> {
        Self::delete(self, id).await
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        Self::find_by_id(self, id).await
    }

    async fn find_by_username(
        &self,
        normalized_username: &str,
    ) -> Result<Option<Account>, RepositoryError> {
        Self::find_by_username(self, normalized_username).await
    }

    async fn find_by_email(
        &self,
        normalized_email: &str,
    ) -> Result<Option<Account>, RepositoryError> {
        Self::find_by_email(self, normalized_email).await
    }
}

impl CredentialStore for AccountRepository<'_> {
    async fn password_hash(&self, id: AccountId) -> Result<Option<String>, RepositoryError> {
        Self::password_hash(self, id).await
    }

    async fn set_password_hash(
        &self,
        id: AccountId,
        hash: Option<&str>,
    ) -> Result<(), IdentityFailure> {
        Self::set_password_hash(self, id, hash).await
    }

    async fn has_password(&self, id: AccountId) -> Result<bool, RepositoryError> {
        Self::has_password(self, id).await
    }
}

impl EmailStore for AccountRepository<'_> {
    async fn email(&self, id: AccountId) -> Result<Option<Email>, RepositoryError> {
        Self::email(self, id).await
    }

    async fn set_email(&self, id: AccountId, email: &Email) -> Result<(), IdentityFailure> {
        Self::set_email(self, id, email).await
    }

    async fn email_confirmed(&self, id: AccountId) -> Result<Option<bool>, RepositoryError> {
        Self::email_confirmed(self, id).await
    }

    async fn set_email_confirmed(
        &self,
        id: AccountId,
        confirmed: bool,
    ) -> Result<(), IdentityFailure> {
        Self::set_email_confirmed(self, id, confirmed).await
    }
}

impl RoleMembershipStore for AccountRepository<'_> {
    async fn add_to_role(
        &self,
        id: AccountId,
        normalized_role: &str,
    ) -> Result<(), IdentityFailure> {
        Self::add_to_role(self, id, normalized_role).await
    }

    async fn remove_from_role(
        &self,
        id: AccountId,
        normalized_role: &str,
    ) -> Result<(), IdentityFailure> {
        Self::remove_from_role(self, id, normalized_role).await
    }

    async fn roles_for(&self, id: AccountId) -> Result<Vec<String>, RepositoryError> {
        Self::roles_for(self, id).await
    }

    async fn accounts_in_role(
        &self,
        normalized_role: &str,
    ) -> Result<Vec<Account>, RepositoryError> {
        Self::accounts_in_role(self, normalized_role).await
    }

    async fn is_in_role(
        &self,
        id: AccountId,
        normalized_role: &str,
    ) -> Result<bool, RepositoryError> {
        Self::is_in_role(self, id, normalized_role).await
    }
}
