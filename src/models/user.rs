//! User model and credential request bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Full user row from database (includes password_hash — never serialize to API).
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// User response DTO — excludes the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            created_at: u.created_at,
        }
    }
}

/// Request body shared by register and login. Absent fields deserialize as
/// empty and are rejected by validation, so "missing" and "empty" get the
/// same client error.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Credentials {
    #[serde(default)]
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_response_excludes_password() {
        let json = serde_json::to_string(&UserResponse {
            id: Uuid::nil(),
            username: "alice".to_string(),
            created_at: Utc::now(),
        })
        .unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("hash"));
    }

    #[test]
    fn user_to_response_conversion() {
        let user = User {
            id: Uuid::nil(),
            username: "alice".to_string(),
            password_hash: "secret_hash".to_string(),
            created_at: Utc::now(),
        };
        let response: UserResponse = user.into();
        assert_eq!(response.username, "alice");
    }

    #[test]
    fn empty_credentials_rejected() {
        let creds = Credentials {
            username: String::new(),
            password: "pw123".to_string(),
        };
        assert!(creds.validate().is_err());

        let creds = Credentials {
            username: "alice".to_string(),
            password: String::new(),
        };
        assert!(creds.validate().is_err());
    }

    #[test]
    fn present_credentials_accepted() {
        let creds = Credentials {
            username: "alice".to_string(),
            password: "pw123".to_string(),
        };
        assert!(creds.validate().is_ok());
    }
}
