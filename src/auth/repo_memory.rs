use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::{StoreError, UserStore};
use super::repo_types::{Role, SoftDelete, Timestamps, User};

/// In-process stand-in for the postgres store, with the same uniqueness
/// and soft-delete rules.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
    offline: AtomicBool,
}

impl MemoryUserStore {
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn soft_delete(&self, id: Uuid) {
        let mut users = self.users.lock().unwrap();
        if let Some(u) = users.iter_mut().find(|u| u.id == id) {
            u.soft_delete.deleted_at = Some(OffsetDateTime::now_utc());
        }
    }

    /// Account that exists but has no password set.
    pub fn insert_passwordless(&self, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.users.lock().unwrap().push(User {
            id,
            email: email.to_owned(),
            password_hash: None,
            first_name: None,
            last_name: None,
            phone: None,
            locale: None,
            role: Role::default(),
            timestamps: Timestamps::now(),
            soft_delete: SoftDelete::default(),
        });
        id
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.check_online()?;
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.is_active() && u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.check_online()?;
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.is_active() && u.id == id).cloned())
    }

    async fn insert(
        &self,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, StoreError> {
        self.check_online()?;
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.is_active() && u.email.eq_ignore_ascii_case(email))
        {
            return Err(StoreError::Conflict);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            password_hash: Some(password_hash.to_owned()),
            first_name: None,
            last_name: None,
            phone: None,
            locale: None,
            role,
            timestamps: Timestamps::now(),
            soft_delete: SoftDelete::default(),
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_enforces_case_insensitive_uniqueness() {
        let store = MemoryUserStore::default();
        store.insert("a@example.com", "h", Role::Artist).await.unwrap();
        let err = store
            .insert("A@Example.com", "h", Role::Artist)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
    }

    #[tokio::test]
    async fn soft_deleted_users_are_hidden_and_free_their_email() {
        let store = MemoryUserStore::default();
        let user = store.insert("a@example.com", "h", Role::Artist).await.unwrap();
        store.soft_delete(user.id);

        assert!(store.find_by_id(user.id).await.unwrap().is_none());
        assert!(store.find_by_email("a@example.com").await.unwrap().is_none());
        store.insert("a@example.com", "h2", Role::Collector).await.unwrap();
    }
}
