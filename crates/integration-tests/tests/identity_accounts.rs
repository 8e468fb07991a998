//! Integration tests for the identity storage adapter.
//!
//! Run with `cargo test -p mossberry-integration-tests -- --ignored`
//! against a migrated identity database.

use uuid::Uuid;

use mossberry_core::Email;
use mossberry_identity::models::{Account, Role};
use mossberry_identity::store::{
    AccountRepository, IdentityFailure, RegistrationReport, RoleRepository,
};
use mossberry_integration_tests::TestContext;

fn test_account(tag: &str) -> Account {
    let suffix = Uuid::new_v4().simple().to_string();
    let email = Email::parse(&format!("{tag}-{suffix}@example.com")).unwrap();
    Account::new(format!("{tag}-{suffix}"), email, None)
}

#[tokio::test]
#[ignore = "Requires a migrated identity database"]
async fn test_create_then_find_round_trips() {
    let ctx = TestContext::new().await;
    let repo = AccountRepository::new(&ctx.identity_pool);

    let account = test_account("roundtrip");
    repo.create(&account).await.unwrap();

    let by_id = repo.find_by_id(account.id).await.unwrap().unwrap();
    assert_eq!(by_id.username, account.username);
    assert_eq!(by_id.normalized_email, account.normalized_email);
    // Freshly created accounts get an empty synthesized profile.
    assert!(by_id.profile.first_name.is_empty());

    let by_name = repo
        .find_by_username(&account.normalized_username)
        .await
        .unwrap();
    assert!(by_name.is_some());

    let by_email = repo
        .find_by_email(&account.normalized_email)
        .await
        .unwrap();
    assert!(by_email.is_some());

    repo.delete(account.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires a migrated identity database"]
async fn test_duplicate_id_fails_structurally_and_changes_nothing() {
    let ctx = TestContext::new().await;
    let repo = AccountRepository::new(&ctx.identity_pool);

    let account = test_account("dup-id");
    repo.create(&account).await.unwrap();

    let mut intruder = test_account("dup-id-intruder");
    intruder.id = account.id;
    let failure = repo.create(&intruder).await.unwrap_err();
    assert_eq!(failure.code, IdentityFailure::DUPLICATE_ACCOUNT_ID);

    // The original record is untouched.
    let stored = repo.find_by_id(account.id).await.unwrap().unwrap();
    assert_eq!(stored.username, account.username);

    repo.delete(account.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires a migrated identity database"]
async fn test_duplicate_username_and_email_codes() {
    let ctx = TestContext::new().await;
    let repo = AccountRepository::new(&ctx.identity_pool);

    let account = test_account("dup-keys");
    repo.create(&account).await.unwrap();

    let mut same_name = test_account("dup-keys-other");
    same_name.username.clone_from(&account.username);
    same_name.normalized_username.clone_from(&account.normalized_username);
    let failure = repo.create(&same_name).await.unwrap_err();
    assert_eq!(failure.code, IdentityFailure::DUPLICATE_USERNAME);

    let mut same_email = test_account("dup-keys-other2");
    same_email.email = account.email.clone();
    same_email.normalized_email.clone_from(&account.normalized_email);
    let failure = repo.create(&same_email).await.unwrap_err();
    assert_eq!(failure.code, IdentityFailure::DUPLICATE_EMAIL);

    repo.delete(account.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires a migrated identity database"]
async fn test_password_hash_storage_is_opaque() {
    let ctx = TestContext::new().await;
    let repo = AccountRepository::new(&ctx.identity_pool);

    let account = test_account("password");
    repo.create(&account).await.unwrap();
    assert!(!repo.has_password(account.id).await.unwrap());

    repo.set_password_hash(account.id, Some("v1$not-a-real-hash"))
        .await
        .unwrap();
    assert!(repo.has_password(account.id).await.unwrap());
    assert_eq!(
        repo.password_hash(account.id).await.unwrap().as_deref(),
        Some("v1$not-a-real-hash")
    );

    repo.set_password_hash(account.id, None).await.unwrap();
    assert!(!repo.has_password(account.id).await.unwrap());

    repo.delete(account.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires a migrated identity database"]
async fn test_role_membership_with_unknown_role_is_a_noop() {
    let ctx = TestContext::new().await;
    let accounts = AccountRepository::new(&ctx.identity_pool);
    let roles = RoleRepository::new(&ctx.identity_pool);

    let account = test_account("membership");
    accounts.create(&account).await.unwrap();

    // Unknown role: no failure, no membership.
    accounts
        .add_to_role(account.id, "NO-SUCH-ROLE")
        .await
        .unwrap();
    assert!(accounts.roles_for(account.id).await.unwrap().is_empty());

    let role = Role::new(format!("editors-{}", Uuid::new_v4().simple()));
    roles.create(&role).await.unwrap();

    accounts
        .add_to_role(account.id, &role.normalized_name)
        .await
        .unwrap();
    // Adding twice is idempotent.
    accounts
        .add_to_role(account.id, &role.normalized_name)
        .await
        .unwrap();

    assert!(accounts
        .is_in_role(account.id, &role.normalized_name)
        .await
        .unwrap());
    assert_eq!(accounts.roles_for(account.id).await.unwrap(), vec![role.name.clone()]);

    let members = accounts
        .accounts_in_role(&role.normalized_name)
        .await
        .unwrap();
    assert!(members.iter().any(|a| a.id == account.id));

    accounts
        .remove_from_role(account.id, &role.normalized_name)
        .await
        .unwrap();
    assert!(!accounts
        .is_in_role(account.id, &role.normalized_name)
        .await
        .unwrap());

    roles.delete(role.id).await.unwrap();
    accounts.delete(account.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires a migrated identity database"]
async fn test_search_filters_combine() {
    let ctx = TestContext::new().await;
    let accounts = AccountRepository::new(&ctx.identity_pool);
    let roles = RoleRepository::new(&ctx.identity_pool);

    let role = Role::new(format!("searchers-{}", Uuid::new_v4().simple()));
    roles.create(&role).await.unwrap();

    let marker = format!("srch{}", Uuid::new_v4().simple());
    let in_role = test_account(&marker);
    let out_of_role = test_account(&marker);
    accounts.create(&in_role).await.unwrap();
    accounts.create(&out_of_role).await.unwrap();
    accounts
        .add_to_role(in_role.id, &role.normalized_name)
        .await
        .unwrap();

    let by_keyword = accounts
        .search(Some(&marker), None, 0, 50)
        .await
        .unwrap();
    assert_eq!(by_keyword.len(), 2);
    assert_eq!(
        accounts.count_accounts(Some(&marker), None).await.unwrap(),
        2
    );

    let by_both = accounts
        .search(Some(&marker), Some(&role.normalized_name), 0, 50)
        .await
        .unwrap();
    assert_eq!(by_both.len(), 1);
    assert_eq!(by_both.first().map(|a| a.id), Some(in_role.id));

    // An empty window skips the store entirely.
    assert!(accounts
        .search(Some(&marker), None, 0, 0)
        .await
        .unwrap()
        .is_empty());

    roles.delete(role.id).await.unwrap();
    accounts.delete(in_role.id).await.unwrap();
    accounts.delete(out_of_role.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires a migrated identity database"]
async fn test_profile_upsert_on_update() {
    let ctx = TestContext::new().await;
    let repo = AccountRepository::new(&ctx.identity_pool);

    let mut account = test_account("profile");
    repo.create(&account).await.unwrap();

    account.profile.first_name = "Ada".to_owned();
    account.profile.last_name = "Lovelace".to_owned();
    repo.update(&account).await.unwrap();

    let stored = repo.find_by_id(account.id).await.unwrap().unwrap();
    assert_eq!(stored.profile.first_name, "Ada");
    assert_eq!(stored.profile.last_name, "Lovelace");

    repo.delete(account.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires a migrated identity database"]
async fn test_registration_series_has_one_value_per_day() {
    let ctx = TestContext::new().await;
    let repo = AccountRepository::new(&ctx.identity_pool);
    let report = RegistrationReport::new(&ctx.identity_pool);

    let before = *report.daily_registrations(1).await.unwrap().first().unwrap();

    let account = test_account("report");
    repo.create(&account).await.unwrap();

    let series = report.daily_registrations(7).await.unwrap();
    assert_eq!(series.len(), 7);
    assert_eq!(*series.last().unwrap(), before + 1);

    assert!(report.daily_registrations(0).await.unwrap().is_empty());

    repo.delete(account.id).await.unwrap();
}
