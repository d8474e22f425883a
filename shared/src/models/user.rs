//! User and role models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_password;

/// Shop roles. Managers administer the catalog and accounts; sellers run the till.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum UserRole {
    #[serde(rename = "gerant")]
    Manager,
    #[serde(rename = "vendeur")]
    #[default]
    Seller,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Manager => "gerant",
            UserRole::Seller => "vendeur",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "gerant" => Some(UserRole::Manager),
            "vendeur" => Some(UserRole::Seller),
            _ => None,
        }
    }

    pub fn is_manager(&self) -> bool {
        matches!(self, UserRole::Manager)
    }

    /// Both roles may create and cancel sales
    pub fn can_sell(&self) -> bool {
        true
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user account, without credentials
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(custom = "validate_password")]
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
    #[validate(length(max = 500, message = "Photo URL must be at most 500 characters"))]
    pub photo_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&UserRole::Manager).unwrap(), "\"gerant\"");
        assert_eq!(UserRole::parse("vendeur"), Some(UserRole::Seller));
        assert_eq!(UserRole::parse("admin"), None);
    }

    #[test]
    fn test_role_permissions() {
        assert!(UserRole::Manager.is_manager());
        assert!(!UserRole::Seller.is_manager());
        assert!(UserRole::Seller.can_sell());
    }

    #[test]
    fn test_create_user_defaults_to_seller() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"email":"vendeur@stockchic.fr","password":"secret1"}"#,
        )
        .unwrap();
        assert_eq!(req.role, UserRole::Seller);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_user_rejects_short_password() {
        let req: CreateUserRequest =
            serde_json::from_str(r#"{"email":"vendeur@stockchic.fr","password":"abc"}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
