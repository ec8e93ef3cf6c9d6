//! Port abstraction for the credential store and its errors.
//!
//! Production backs this port with PostgreSQL; tests and the no-database
//! development fallback use the in-memory implementation below.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::user::{NewUser, User, UserId};
use crate::domain::{EmailAddress, Error};

/// Identity field whose uniqueness was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Email,
    Username,
}

impl IdentityField {
    /// Stable lowercase name used in error payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Username => "username",
        }
    }
}

impl std::fmt::Display for IdentityField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistence errors raised by credential store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserStoreError {
    /// Another account already holds the given unique identity field.
    #[error("{field} is already in use")]
    DuplicateIdentity { field: IdentityField },
    /// Store connection could not be established.
    #[error("credential store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("credential store query failed: {message}")]
    Query { message: String },
}

impl UserStoreError {
    /// Duplicate unique identity constructor.
    pub fn duplicate_identity(field: IdentityField) -> Self {
        Self::DuplicateIdentity { field }
    }

    /// Connection failure constructor.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Query failure constructor.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Map storage failures to transport-agnostic domain errors.
///
/// Duplicate identity intentionally surfaces as a client error (HTTP 400,
/// matching the published contract), not as a conflict.
pub fn map_user_store_error(error: UserStoreError) -> Error {
    match error {
        UserStoreError::DuplicateIdentity { field } => {
            Error::invalid_request(format!("{field} is already in use")).with_details(
                serde_json::json!({ "field": field.as_str(), "code": "duplicate_identity" }),
            )
        }
        UserStoreError::Connection { message } => Error::service_unavailable(message),
        UserStoreError::Query { message } => Error::internal(message),
    }
}

/// Driven port for account persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new account, enforcing email and username uniqueness.
    async fn create(&self, new_user: NewUser) -> Result<User, UserStoreError>;

    /// Fetch an account by its unique email (exact, case-sensitive match).
    async fn find_by_email(&self, email: &EmailAddress)
        -> Result<Option<User>, UserStoreError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserStoreError>;
}

/// In-memory credential store for tests and database-less development runs.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, UserStoreError> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| UserStoreError::query("user store lock poisoned"))?;

        if users.values().any(|u| u.email() == &new_user.email) {
            return Err(UserStoreError::duplicate_identity(IdentityField::Email));
        }
        if users.values().any(|u| u.username() == &new_user.username) {
            return Err(UserStoreError::duplicate_identity(IdentityField::Username));
        }

        let user = User::new(
            UserId::random(),
            new_user.username,
            new_user.email,
            new_user.password_hash,
            new_user.role,
            Utc::now(),
        );
        users.insert(*user.id(), user.clone());
        Ok(user)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserStoreError> {
        let users = self
            .users
            .lock()
            .map_err(|_| UserStoreError::query("user store lock poisoned"))?;
        Ok(users.values().find(|u| u.email() == email).cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserStoreError> {
        let users = self
            .users
            .lock()
            .map_err(|_| UserStoreError::query("user store lock poisoned"))?;
        Ok(users.get(id).cloned())
    }
}
