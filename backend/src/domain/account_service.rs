//! Account use-cases: registration, login, and profile lookup.
//!
//! Orchestrates the credential store, Argon2 hashing, and the token issuer.
//! Handlers depend on this service so they stay free of persistence and
//! crypto concerns.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use super::auth::{LoginCredentials, RegistrationDetails};
use super::password::{hash_password, verify_password};
use super::ports::{UserRepository, map_user_store_error};
use super::token::TokenIssuer;
use super::user::{NewUser, Role, UserId, UserProfile};
use super::Error;

/// Message returned for any credential failure at login.
///
/// Unknown email and wrong password are deliberately indistinguishable to
/// avoid account enumeration.
const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Profile plus freshly minted session token, returned by register and login.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedAccount {
    /// Public identity of the account.
    #[serde(flatten)]
    pub profile: UserProfile,
    /// Signed session token for subsequent bearer authentication.
    pub token: String,
}

/// Account use-case service over the credential store and token issuer.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenIssuer>,
}

impl AccountService {
    /// Create a service over the given store and issuer.
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<TokenIssuer>) -> Self {
        Self { users, tokens }
    }

    /// Register a new account with the default `standard` role.
    ///
    /// Identity uniqueness is enforced by the store; a duplicate email or
    /// username surfaces as a client error.
    pub async fn register(
        &self,
        details: RegistrationDetails,
    ) -> Result<AuthenticatedAccount, Error> {
        let password_hash = hash_password(details.password())?;
        let user = self
            .users
            .create(NewUser {
                username: details.username().clone(),
                email: details.email().clone(),
                password_hash,
                role: Role::default(),
            })
            .await
            .map_err(map_user_store_error)?;

        let token = self.tokens.issue(&user)?;
        tracing::info!(user_id = %user.id(), "account registered");
        Ok(AuthenticatedAccount {
            profile: user.profile(),
            token,
        })
    }

    /// Authenticate credentials and mint a fresh session token.
    pub async fn login(&self, credentials: LoginCredentials) -> Result<AuthenticatedAccount, Error> {
        let user = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_store_error)?
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?;

        if !verify_password(credentials.password(), user.password_hash())? {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        let token = self.tokens.issue(&user)?;
        Ok(AuthenticatedAccount {
            profile: user.profile(),
            token,
        })
    }

    /// Public profile of an authenticated caller.
    pub async fn profile(&self, id: &UserId) -> Result<UserProfile, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_store_error)?
            .map(|user| user.profile())
            .ok_or_else(|| Error::not_found("account no longer exists"))
    }
}
