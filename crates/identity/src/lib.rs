//! Mossberry Identity - storage adapter for the external identity framework.
//!
//! The authentication framework this site uses brings its own protocol,
//! password hashing, and managers; what it needs from us is a pluggable
//! storage backend. This crate supplies that backend against the identity
//! `PostgreSQL` database:
//!
//! - [`store::AccountRepository`] - account + profile persistence, credential
//!   and email field access, role membership, paginated account search
//! - [`store::RoleRepository`] - role CRUD for the framework's role manager
//! - [`store::RegistrationReport`] - daily registration counts
//!
//! The framework's storage capabilities are modeled as narrow traits in
//! [`traits`] ([`traits::AccountStore`], [`traits::CredentialStore`],
//! [`traits::RoleMembershipStore`], [`traits::EmailStore`]), all implemented
//! by the one repository type - logically separate capabilities, co-located
//! implementation.
//!
//! Write operations (`create`/`update`/`delete`) translate store failures
//! into the structured [`store::IdentityFailure`] shape the framework
//! expects; reads propagate [`store::RepositoryError`] unfiltered and model
//! absence as `Ok(None)`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod store;
pub mod traits;
