//! Account and profile models.
//!
//! The field set is dictated by the external identity framework's user
//! record: display + normalized name/email pairs, opaque password hash,
//! security/concurrency stamps, phone and lockout/2FA state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mossberry_core::{AccountId, Email};

/// A user account as the identity framework sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Framework-assigned UUID.
    pub id: AccountId,
    /// Display username.
    pub username: String,
    /// Uppercase-invariant username for case-insensitive uniqueness.
    pub normalized_username: String,
    /// Display email.
    pub email: Email,
    /// Uppercase-invariant email, kept in sync with `email`.
    pub normalized_email: String,
    /// Whether the email has been confirmed.
    pub email_confirmed: bool,
    /// Opaque password hash; `None` means no password credential.
    pub password_hash: Option<String>,
    /// Invalidated when credentials change.
    pub security_stamp: String,
    /// Optimistic-concurrency stamp maintained by the framework.
    pub concurrency_stamp: String,
    /// Phone number, if provided.
    pub phone_number: Option<String>,
    /// Whether the phone number has been confirmed.
    pub phone_confirmed: bool,
    /// Whether two-factor auth is enabled.
    pub two_factor_enabled: bool,
    /// When a lockout ends, if one is in effect.
    pub lockout_end: Option<DateTime<Utc>>,
    /// Whether this account can be locked out at all.
    pub lockout_enabled: bool,
    /// Consecutive failed access attempts.
    pub access_failed_count: i32,
    /// When the account was created (registration reporting keys off this).
    pub created_at: DateTime<Utc>,
    /// The 1:1 profile, synthesized empty when no row exists.
    pub profile: UserProfile,
}

impl Account {
    /// Build a new account record for the given credentials, generating the
    /// id and stamps. The caller supplies an already-hashed password (or
    /// none); hashing is the framework's business.
    #[must_use]
    pub fn new(username: String, email: Email, password_hash: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::generate(),
            normalized_username: username.to_uppercase(),
            username,
            normalized_email: email.normalized(),
            email,
            email_confirmed: false,
            password_hash,
            security_stamp: uuid::Uuid::new_v4().to_string(),
            concurrency_stamp: uuid::Uuid::new_v4().to_string(),
            phone_number: None,
            phone_confirmed: false,
            two_factor_enabled: false,
            lockout_end: None,
            lockout_enabled: true,
            access_failed_count: 0,
            created_at: now,
            profile: UserProfile::synthesized(now),
        }
    }

    /// Whether a non-empty password hash is stored.
    #[must_use]
    pub fn has_password(&self) -> bool {
        self.password_hash.as_deref().is_some_and(|h| !h.is_empty())
    }
}

/// The 1:1 profile owned by an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact telephone.
    pub telephone: String,
    /// When the profile row was created.
    pub created_at: DateTime<Utc>,
    /// When the profile row was last touched.
    pub modified_at: DateTime<Utc>,
}

impl UserProfile {
    /// Empty-but-valid profile used when an account has no profile row.
    #[must_use]
    pub fn synthesized(at: DateTime<Utc>) -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            telephone: String::new(),
            created_at: at,
            modified_at: at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_derives_normalized_forms() {
        let email = Email::parse("Ada@Example.com").unwrap();
        let account = Account::new("Ada".to_owned(), email, None);
        assert_eq!(account.normalized_username, "ADA");
        assert_eq!(account.normalized_email, "ADA@EXAMPLE.COM");
        assert!(!account.email_confirmed);
        assert_ne!(account.security_stamp, account.concurrency_stamp);
    }

    #[test]
    fn test_has_password_requires_non_empty_hash() {
        let email = Email::parse("a@b.c").unwrap();
        let mut account = Account::new("a".to_owned(), email, None);
        assert!(!account.has_password());
        account.password_hash = Some(String::new());
        assert!(!account.has_password());
        account.password_hash = Some("v1$argon".to_owned());
        assert!(account.has_password());
    }
}
