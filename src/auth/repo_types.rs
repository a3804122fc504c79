use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Account role, stored as the `role` postgres enum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Artist,
    VenueAdmin,
    Collector,
    Agent,
    PrintShop,
}

/// created/updated pair shared by most tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct Timestamps {
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Timestamps {
    #[cfg(test)]
    pub fn now() -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct SoftDelete {
    pub deleted_at: Option<OffsetDateTime>,
}

impl SoftDelete {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: Option<String>, // Argon2 PHC string; None for accounts without a password
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub locale: Option<String>,
    pub role: Role,
    #[sqlx(flatten)]
    pub timestamps: Timestamps,
    #[sqlx(flatten)]
    pub soft_delete: SoftDelete,
}

impl User {
    pub fn is_active(&self) -> bool {
        !self.soft_delete.is_deleted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_defaults_to_artist_and_uses_snake_case() {
        assert_eq!(Role::default(), Role::Artist);
        assert_eq!(serde_json::to_string(&Role::VenueAdmin).unwrap(), "\"venue_admin\"");
        let role: Role = serde_json::from_str("\"print_shop\"").unwrap();
        assert_eq!(role, Role::PrintShop);
        assert!(serde_json::from_str::<Role>("\"superuser\"").is_err());
    }
}
