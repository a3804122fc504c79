use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{Role, User};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            role: u.role,
            created_at: u.timestamps.created_at,
            updated_at: u.timestamps.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::{SoftDelete, Timestamps};

    #[test]
    fn user_dto_never_carries_the_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: "test@example.com".into(),
            password_hash: Some("$argon2id$v=19$secret".into()),
            first_name: Some("Ada".into()),
            last_name: None,
            phone: None,
            locale: None,
            role: Role::Collector,
            timestamps: Timestamps::now(),
            soft_delete: SoftDelete::default(),
        };

        let json = serde_json::to_value(UserDto::from(user)).unwrap();
        assert_eq!(json["email"], "test@example.com");
        assert_eq!(json["role"], "collector");
        assert!(json.get("password_hash").is_none());
        assert!(!json.to_string().contains("argon2"));
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 5);
    }

    #[test]
    fn register_role_is_optional() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"email":"a@b.co","password":"secret123"}"#).unwrap();
        assert!(req.role.is_none());
        let req: RegisterRequest = serde_json::from_str(
            r#"{"email":"a@b.co","password":"secret123","role":"agent"}"#,
        )
        .unwrap();
        assert_eq!(req.role, Some(Role::Agent));
    }
}
