use std::collections::HashMap;
use std::path::{Path, PathBuf};
use bcrypt::{hash, verify, BcryptError};
use tokio::sync::Mutex;
use crate::config::AuthConfig;
use crate::errors::{AppError, AppResult, StorageResult};
use crate::models::{User, UserId};
use super::json_file;

#[derive(Default)]
struct UserIndex {
    users: Vec<User>,
    by_username: HashMap<String, usize>,
    by_id: HashMap<UserId, usize>,
}

impl UserIndex {
    fn new(users: Vec<User>) -> Self {
        let mut index = Self::default();
        for user in users {
            index.push(user);
        }
        index
    }

    // Users are never removed, so positions stay valid
    fn push(&mut self, user: User) {
        let i = self.users.len();
        self.by_username.entry(user.username.clone()).or_insert(i);
        self.by_id.entry(user.id.clone()).or_insert(i);
        self.users.push(user);
    }

    fn pop(&mut self) {
        if let Some(user) = self.users.pop() {
            self.by_username.remove(&user.username);
            self.by_id.remove(&user.id);
        }
    }

    fn find_by_username(&self, username: &str) -> Option<&User> {
        self.by_username.get(username).map(|&i| &self.users[i])
    }
}

/// Registered accounts, mirrored to `users.json`.
pub struct CredentialStore {
    path: PathBuf,
    bcrypt_cost: u32,
    min_password_length: usize,
    inner: Mutex<UserIndex>,
}

impl CredentialStore {
    pub async fn open(path: impl AsRef<Path>, auth: &AuthConfig) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let users = json_file::load(&path).await?;
        Ok(Self {
            path,
            bcrypt_cost: auth.bcrypt_cost,
            min_password_length: auth.min_password_length,
            inner: Mutex::new(UserIndex::new(users)),
        })
    }

    /// Creates an account. Usernames are unique and compared case-sensitively.
    pub async fn register(&self, username: &str, password: &str) -> AppResult<UserId> {
        if username.trim().is_empty() {
            return Err(AppError::Validation("Username must not be empty".into()));
        }
        if password.chars().count() < self.min_password_length.max(1) {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                self.min_password_length.max(1)
            )));
        }
        // bcrypt refuses NUL bytes
        if password.contains('\0') {
            return Err(AppError::Validation("Password must not contain NUL characters".into()));
        }

        // Fail fast before paying for the hash
        if self.inner.lock().await.find_by_username(username).is_some() {
            return Err(AppError::DuplicateUsername(username.to_string()));
        }

        let password = password.to_string();
        let cost = self.bcrypt_cost;
        let password_hash = tokio::task::spawn_blocking(move || hash(password, cost))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))??;

        let mut index = self.inner.lock().await;
        // Another request may have taken the name while we were hashing
        if index.find_by_username(username).is_some() {
            return Err(AppError::DuplicateUsername(username.to_string()));
        }

        let user = User::new(username.to_string(), password_hash);
        let user_id = user.id.clone();
        index.push(user);

        if let Err(e) = json_file::save(&self.path, &index.users).await {
            index.pop();
            return Err(e.into());
        }

        Ok(user_id)
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<UserId> {
        let user = self
            .inner
            .lock()
            .await
            .find_by_username(username)
            .cloned()
            .ok_or(AppError::InvalidCredentials)?;

        let password = password.to_string();
        let stored = user.password_hash.clone();
        let matches = match tokio::task::spawn_blocking(move || verify(password, &stored))
            .await
            .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))?
        {
            Ok(matches) => matches,
            // a password bcrypt cannot hash can never match a stored hash
            Err(BcryptError::InvalidPassword) => false,
            Err(e) => return Err(e.into()),
        };

        if matches {
            Ok(user.id)
        } else {
            Err(AppError::InvalidCredentials)
        }
    }

    pub async fn get(&self, user_id: &str) -> Option<User> {
        let index = self.inner.lock().await;
        index.by_id.get(user_id).map(|&i| index.users[i].clone())
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.users.len()
    }
}
