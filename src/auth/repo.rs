use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::{Role, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered")]
    Conflict,
    #[error("user store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

/// Persistence seam for user accounts. Lookups only return live
/// (not soft-deleted) rows.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Case-insensitive lookup among live users.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Fails with [`StoreError::Conflict`] when a live user already owns the email.
    async fn insert(&self, email: &str, password_hash: &str, role: Role)
        -> Result<User, StoreError>;
}

const USER_COLUMNS: &str = "id, email::text AS email, password_hash, first_name, last_name, \
                            phone, locale, role, created_at, updated_at, deleted_at";

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1::citext AND deleted_at IS NULL"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn insert(
        &self,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, StoreError> {
        // The partial unique index on live emails is the commit-time guard;
        // a racing registration surfaces here as a unique violation.
        let sql = format!(
            "INSERT INTO users (id, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(email)
            .bind(password_hash)
            .bind(role)
            .fetch_one(&self.db)
            .await
            .map_err(|e| {
                let unique = e
                    .as_database_error()
                    .map_or(false, |db| db.is_unique_violation());
                if unique {
                    StoreError::Conflict
                } else {
                    StoreError::Unavailable(e)
                }
            })
    }
}
