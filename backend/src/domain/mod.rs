//! Domain layer: core types, ports, and use-case services.
//!
//! Everything here is transport-agnostic. HTTP adapters live under
//! `inbound`, persistence and scoring adapters under `outbound`.

pub mod account_service;
pub mod auth;
pub mod error;
pub mod password;
pub mod ports;
pub mod prediction;
pub mod prediction_service;
pub mod token;
pub mod user;

pub use account_service::{AccountService, AuthenticatedAccount};
pub use auth::{
    CallerContext, CredentialValidationError, LoginCredentials, PASSWORD_MIN, RegistrationDetails,
};
pub use error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use prediction::{
    FeatureVector, PredictionRecord, PredictionSummary, PredictionWithOwner, ScoringOutcome,
};
pub use prediction_service::{AllPredictions, OwnedPredictions, PredictionService};
pub use token::{TokenConfig, TokenError, TokenIssuer, DEFAULT_TTL_HOURS};
pub use user::{EmailAddress, NewUser, Role, User, UserId, UserProfile, Username};
