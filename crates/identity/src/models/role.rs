//! Role model.

use serde::{Deserialize, Serialize};

use mossberry_core::RoleId;

/// A role accounts can belong to. Deleting a role cascades to its
/// memberships.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// Framework-assigned UUID.
    pub id: RoleId,
    /// Display name.
    pub name: String,
    /// Uppercase-invariant name for case-insensitive lookup.
    pub normalized_name: String,
}

impl Role {
    /// Build a new role, generating the id and deriving the normalized name.
    #[must_use]
    pub fn new(name: String) -> Self {
        Self {
            id: RoleId::generate(),
            normalized_name: name.to_uppercase(),
            name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_role_normalizes_name() {
        let role = Role::new("Admin".to_owned());
        assert_eq!(role.name, "Admin");
        assert_eq!(role.normalized_name, "ADMIN");
    }
}
