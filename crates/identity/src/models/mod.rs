//! Domain models for the identity database.

pub mod account;
pub mod role;

pub use account::{Account, UserProfile};
pub use role::Role;
