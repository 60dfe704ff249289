// ============================
// crates/backend-lib/src/store.rs
// ============================
//! User store abstraction with an in-memory implementation.
//!
//! The persistent user store is an external collaborator; this module only
//! pins down the minimal contract the auth core needs from it. The
//! `MemoryUserStore` implementation backs local development and tests.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use parley_common::PublicUser;

/// Privilege level of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// A stored user record. The `password_hash` field only ever holds a hash;
/// plaintext never reaches the store.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub is_online: bool,
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Client-safe projection, without the password hash.
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            avatar_url: self.avatar_url.clone(),
            is_online: self.is_online,
            last_seen: self.last_seen,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Fields required to create a user. Identifier and timestamps are assigned
/// by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub avatar_url: Option<String>,
}

/// Trait for user store backends
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by lowercase-normalized email
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError>;

    /// Look up a user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AppError>;

    /// Look up a user by identifier
    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, AppError>;

    /// Persist a new user. Fails with `DuplicateUser` when the email or
    /// username is already taken.
    async fn create(&self, user: NewUser) -> Result<UserRecord, AppError>;

    /// Persist the mutated fields of an existing record
    async fn save(&self, user: &UserRecord) -> Result<(), AppError>;
}

/// In-memory implementation of the `UserStore` trait
#[derive(Default)]
pub struct MemoryUserStore {
    users: DashMap<String, UserRecord>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.email == email)
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AppError> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.username == username)
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, AppError> {
        Ok(self.users.get(id).map(|entry| entry.value().clone()))
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, AppError> {
        // The store owns the uniqueness invariant, independent of any
        // pre-checks the orchestrator performs.
        let taken = self
            .users
            .iter()
            .any(|entry| entry.email == user.email || entry.username == user.username);
        if taken {
            return Err(AppError::DuplicateUser);
        }

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            avatar_url: user.avatar_url,
            role: Role::User,
            is_online: false,
            last_seen: None,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn save(&self, user: &UserRecord) -> Result<(), AppError> {
        if !self.users.contains_key(&user.id) {
            return Err(AppError::UserNotFound);
        }
        self.users.insert(user.id.clone(), user.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryUserStore::new();
        let created = store.create(new_user("alice1", "a@x.com")).await.unwrap();

        assert_eq!(created.role, Role::User);
        assert!(!created.is_online);

        let by_email = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        let by_username = store.find_by_username("alice1").await.unwrap().unwrap();
        assert_eq!(by_username.id, created.id);

        let by_id = store.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice1");
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates() {
        let store = MemoryUserStore::new();
        store.create(new_user("alice1", "a@x.com")).await.unwrap();

        // Same email, different username
        assert!(matches!(
            store.create(new_user("bob2", "a@x.com")).await,
            Err(AppError::DuplicateUser)
        ));

        // Same username, different email
        assert!(matches!(
            store.create(new_user("alice1", "b@x.com")).await,
            Err(AppError::DuplicateUser)
        ));
    }

    #[tokio::test]
    async fn test_save_overwrites_mutated_fields() {
        let store = MemoryUserStore::new();
        let mut user = store.create(new_user("alice1", "a@x.com")).await.unwrap();

        user.is_online = true;
        user.last_seen = Some(Utc::now());
        store.save(&user).await.unwrap();

        let reloaded = store.find_by_id(&user.id).await.unwrap().unwrap();
        assert!(reloaded.is_online);
        assert!(reloaded.last_seen.is_some());
    }

    #[tokio::test]
    async fn test_save_unknown_user_fails() {
        let store = MemoryUserStore::new();
        let mut ghost = store.create(new_user("alice1", "a@x.com")).await.unwrap();
        ghost.id = "missing".to_string();
        assert!(matches!(
            store.save(&ghost).await,
            Err(AppError::UserNotFound)
        ));
    }
}
