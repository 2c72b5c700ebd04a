//! User Aggregate

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Admin,
    Seller,
    #[default]
    Shopper,
}

impl Role {
    pub fn is_admin(self) -> bool { self == Self::Admin }
    pub fn manages_catalog(self) -> bool { matches!(self, Self::Admin | Self::Seller) }
}

/// Emails are compared case-insensitively, so they are stored folded.
pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles() {
        assert_eq!(Role::default(), Role::Shopper);
        assert!(Role::Seller.manages_catalog());
        assert!(!Role::Shopper.manages_catalog());
        assert!(Role::Admin.is_admin());
        let role: Role = serde_json::from_str("\"seller\"").unwrap();
        assert_eq!(role, Role::Seller);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }
}
