//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Translates between user rows and validated domain accounts, and maps
//! unique-constraint violations onto the duplicate-identity port error so the
//! database stays the single authority on identity uniqueness.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{debug, warn};

use crate::domain::ports::{IdentityField, UserRepository, UserStoreError};
use crate::domain::{EmailAddress, NewUser, Role, User, UserId, Username};

use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the credential store port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserStoreError {
    UserStoreError::connection(error.into_message())
}

/// Identify which unique identity constraint a violation refers to.
///
/// Prefers the constraint name reported by PostgreSQL and falls back to
/// inspecting the message, since not every driver surfaces the name.
fn classify_unique_violation(message: &str, constraint_name: Option<&str>) -> Option<IdentityField> {
    let name = constraint_name.map(str::to_lowercase);
    let haystack = name.as_deref().unwrap_or(message);
    let lower = haystack.to_lowercase();
    if lower.contains("email") {
        Some(IdentityField::Email)
    } else if lower.contains("username") {
        Some(IdentityField::Username)
    } else {
        None
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            match classify_unique_violation(info.message(), info.constraint_name()) {
                Some(field) => UserStoreError::duplicate_identity(field),
                None => {
                    warn!(
                        message = info.message(),
                        constraint_name = ?info.constraint_name(),
                        "unrecognised unique violation on users table"
                    );
                    UserStoreError::query("unique constraint violation")
                }
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            UserStoreError::connection(info.message().to_owned())
        }
        other => {
            debug!(error = %other, "diesel operation failed");
            UserStoreError::query(other.to_string())
        }
    }
}

/// Convert a database row into a validated domain account.
fn row_to_user(row: UserRow) -> Result<User, UserStoreError> {
    let UserRow {
        id,
        username,
        email,
        password_hash,
        role,
        created_at,
    } = row;

    let username =
        Username::new(username).map_err(|err| UserStoreError::query(err.to_string()))?;
    let email =
        EmailAddress::new(email).map_err(|err| UserStoreError::query(err.to_string()))?;
    let role = Role::parse(&role).map_err(|err| UserStoreError::query(err.to_string()))?;

    Ok(User::new(
        UserId::from_uuid(id),
        username,
        email,
        password_hash,
        role,
        created_at,
    ))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let user = User::new(
            UserId::random(),
            new_user.username,
            new_user.email,
            new_user.password_hash,
            new_user.role,
            Utc::now(),
        );
        let new_row = NewUserRow {
            id: *user.id().as_uuid(),
            username: user.username().as_ref(),
            email: user.email().as_ref(),
            password_hash: user.password_hash(),
            role: user.role().as_str(),
            created_at: user.created_at(),
        };

        diesel::insert_into(users::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }
}
