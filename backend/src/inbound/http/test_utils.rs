//! Shared helpers for HTTP handler tests.
//!
//! Builds a full in-memory backend (repositories, token issuer, stub scoring
//! engine) so handler tests exercise the real extraction and service wiring
//! without a database or network.

use std::sync::Arc;

use actix_web::{App, web};
use async_trait::async_trait;
use chrono::Utc;

use crate::domain::ports::{
    InMemoryPredictionRepository, InMemoryUserRepository, PredictionRepository, ScoringEngine,
    ScoringEngineError, UserRepository,
};
use crate::domain::password::hash_password;
use crate::domain::{
    AccountService, AuthenticatedAccount, EmailAddress, Error, FeatureVector, NewUser,
    PredictionService, RegistrationDetails, Role, ScoringOutcome, TokenConfig, TokenIssuer, User,
    UserId, Username,
};
use crate::inbound::http::state::HttpState;

/// Password used for every fixture account.
pub const TEST_PASSWORD: &str = "secret1";

/// Stub engine answering every request with the same outcome.
pub struct FixedEngine(pub ScoringOutcome);

impl Default for FixedEngine {
    fn default() -> Self {
        Self(ScoringOutcome {
            prediction: 450_000.0,
            interval_lower: 420_000.0,
            interval_upper: 480_000.0,
        })
    }
}

#[async_trait]
impl ScoringEngine for FixedEngine {
    async fn score(&self, _features: &FeatureVector) -> Result<ScoringOutcome, ScoringEngineError> {
        Ok(self.0)
    }
}

/// Stub engine failing every request with a transport error.
pub struct FailingEngine;

#[async_trait]
impl ScoringEngine for FailingEngine {
    async fn score(&self, _features: &FeatureVector) -> Result<ScoringOutcome, ScoringEngineError> {
        Err(ScoringEngineError::transport("connection refused"))
    }
}

/// Fully wired in-memory backend for handler tests.
pub struct TestBackend {
    pub state: HttpState,
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenIssuer>,
}

impl TestBackend {
    pub fn new() -> Self {
        Self::build("test-secret", Arc::new(FixedEngine::default()))
    }

    pub fn with_secret(secret: &str) -> Self {
        Self::build(secret, Arc::new(FixedEngine::default()))
    }

    pub fn with_engine(engine: Arc<dyn ScoringEngine>) -> Self {
        Self::build("test-secret", engine)
    }

    fn build(secret: &str, engine: Arc<dyn ScoringEngine>) -> Self {
        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        let records: Arc<dyn PredictionRepository> =
            Arc::new(InMemoryPredictionRepository::new(Arc::clone(&users)));
        let tokens = Arc::new(TokenIssuer::new(&TokenConfig::with_default_ttl(secret)));
        let accounts = AccountService::new(Arc::clone(&users), Arc::clone(&tokens));
        let predictions = PredictionService::new(engine, records);
        Self {
            state: HttpState::new(accounts, predictions, Arc::clone(&tokens)),
            users,
            tokens,
        }
    }

    /// App pre-loaded with this backend's state; tests add routes to it.
    ///
    /// The `use<>` bound keeps the opaque factory free of the `&self`
    /// lifetime, which `init_service` requires to be `'static`.
    pub fn app_builder(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new().app_data(web::Data::new(self.state.clone()))
    }

    /// Seed an admin account directly through the store, the same way the
    /// provisioning binary does.
    pub async fn create_admin(&self, username: &str, email: &str) -> AuthenticatedAccount {
        let user = self
            .users
            .create(NewUser {
                username: Username::new(username).expect("valid username"),
                email: EmailAddress::new(email).expect("valid email"),
                password_hash: hash_password(TEST_PASSWORD).expect("password hashes"),
                role: Role::Admin,
            })
            .await
            .expect("admin account persists");
        let token = self.tokens.issue(&user).expect("token issues");
        AuthenticatedAccount {
            profile: user.profile(),
            token,
        }
    }

    /// Mint a token for an account that was never persisted.
    pub fn issue_token_for(&self, role: Role) -> Result<String, Error> {
        let user = User::new(
            UserId::random(),
            Username::new("ghost").expect("valid username"),
            EmailAddress::new("ghost@x.com").expect("valid email"),
            "$argon2id$fake".to_owned(),
            role,
            Utc::now(),
        );
        self.tokens.issue(&user)
    }
}

/// Register a standard account through the real registration use-case.
pub async fn register_account(
    backend: &TestBackend,
    username: &str,
    email: &str,
) -> AuthenticatedAccount {
    let details = RegistrationDetails::try_from_parts(username, email, TEST_PASSWORD)
        .expect("valid registration");
    backend
        .state
        .accounts
        .register(details)
        .await
        .expect("registration succeeds")
}
