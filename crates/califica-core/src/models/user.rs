use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role assigned by the server. Admins can manage every resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Student,
    Admin,
}

impl UserRole {
    /// Parse a role name as typed by a user ("admin", "Student", ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "student" => Some(UserRole::Student),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Student => write!(f, "student"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

/// A server-issued user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(rename = "isEmailVerified", default, skip_serializing_if = "Option::is_none")]
    pub is_email_verified: Option<bool>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Admin edit of an account. The password is only sent when one was typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserUpdate {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserUpdate {
    pub fn new(name: &str, email: &str, role: UserRole, password: &str) -> Self {
        let password = password.trim();
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            role,
            password: (!password.is_empty()).then(|| password.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_minimal() {
        let json = r#"{"id":"u1","email":"ana@uni.edu","name":"Ana","role":"student"}"#;
        let user: User = serde_json::from_str(json).expect("parse user");
        assert_eq!(user.role, UserRole::Student);
        assert!(user.is_email_verified.is_none());
        assert!(user.created_at.is_none());
        assert!(!user.is_admin());
    }

    #[test]
    fn test_parse_user_full() {
        let json = r#"{"id":"u2","email":"root@uni.edu","name":"Root","role":"admin",
            "isEmailVerified":true,"createdAt":"2024-03-01T10:00:00.000Z","updatedAt":"2024-03-02T10:00:00Z"}"#;
        let user: User = serde_json::from_str(json).expect("parse user");
        assert!(user.is_admin());
        assert_eq!(user.is_email_verified, Some(true));
        assert!(user.created_at.is_some());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(UserRole::parse("Admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse(" student "), Some(UserRole::Student));
        assert_eq!(UserRole::parse("teacher"), None);
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }

    #[test]
    fn test_user_update_skips_blank_password() {
        let update = UserUpdate::new("Ana", "ana@uni.edu", UserRole::Admin, "   ");
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["role"], "admin");
        assert!(json.get("password").is_none());

        let update = UserUpdate::new("Ana", "ana@uni.edu", UserRole::Student, "nueva123");
        assert_eq!(update.password.as_deref(), Some("nueva123"));
    }
}
