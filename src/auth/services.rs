use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{
    dto::{LoginRequest, RegisterRequest, UserDto},
    errors::AuthError,
    jwt::JwtKeys,
    password::Hasher,
    repo::UserStore,
};

pub(crate) const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registration, credential checks and session issuance.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: Hasher,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, hasher: Hasher, keys: JwtKeys) -> Self {
        Self {
            store,
            hasher,
            keys,
        }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<UserDto, AuthError> {
        let email = normalize_email(&req.email);
        if !is_valid_email(&email) {
            warn!(email = %email, "invalid email");
            return Err(AuthError::Validation("Invalid email"));
        }
        if req.password.chars().count() < MIN_PASSWORD_LEN {
            warn!("password too short");
            return Err(AuthError::Validation("Password too short"));
        }

        if self.store.find_by_email(&email).await?.is_some() {
            warn!(email = %email, "email already registered");
            return Err(AuthError::DuplicateEmail);
        }

        let hash = self.hash(req.password).await?;
        let role = req.role.unwrap_or_default();

        // insert is the commit point; a lost race comes back as DuplicateEmail
        let user = self.store.insert(&email, &hash, role).await.map_err(|e| {
            let e = AuthError::from(e);
            if matches!(e, AuthError::DuplicateEmail) {
                warn!(email = %email, "email registered concurrently");
            }
            e
        })?;

        info!(user_id = %user.id, email = %user.email, role = ?user.role, "user registered");
        Ok(user.into())
    }

    pub async fn authenticate(&self, req: LoginRequest) -> Result<UserDto, AuthError> {
        let email = normalize_email(&req.email);
        let user = self
            .store
            .find_by_email(&email)
            .await?
            .filter(|u| u.is_active());

        let stored = user.as_ref().and_then(|u| u.password_hash.clone());
        let ok = self.verify(req.password, stored).await?;

        match user {
            Some(user) if ok => {
                info!(user_id = %user.id, "user logged in");
                Ok(user.into())
            }
            Some(user) => {
                warn!(user_id = %user.id, "login invalid password");
                Err(AuthError::InvalidCredentials)
            }
            None => {
                warn!(email = %email, "login unknown email");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    pub fn issue_session(&self, user_id: Uuid) -> Result<String, AuthError> {
        self.keys.issue(user_id)
    }

    /// Loads the live user a session was issued for.
    pub async fn current_user(&self, user_id: Uuid) -> Result<UserDto, AuthError> {
        match self.store.find_by_id(user_id).await?.filter(|u| u.is_active()) {
            Some(user) => Ok(user.into()),
            None => {
                warn!(user_id = %user_id, "token subject not found");
                Err(AuthError::NotFound)
            }
        }
    }

    async fn hash(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        let hash = tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| AuthError::Internal(e.into()))??;
        Ok(hash)
    }

    async fn verify(&self, password: String, hash: Option<String>) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => hasher.verify_password(&password, &hash),
            None => hasher.verify_dummy(&password),
        })
        .await
        .map_err(|e| AuthError::Internal(e.into()))
    }
}
