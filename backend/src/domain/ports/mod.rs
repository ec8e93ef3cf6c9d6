//! Domain ports (hexagonal seams).
//!
//! Driven ports are implemented by outbound adapters (PostgreSQL, the HTTP
//! scoring client) and by in-memory fallbacks used in tests and
//! database-less development runs.

pub mod prediction_repository;
pub mod scoring_engine;
pub mod user_repository;

pub use prediction_repository::{
    InMemoryPredictionRepository, OwnerDirectory, PredictionRepository, PredictionStoreError,
    map_prediction_store_error,
};
pub use scoring_engine::{ScoringEngine, ScoringEngineError};
pub use user_repository::{
    IdentityField, InMemoryUserRepository, UserRepository, UserStoreError, map_user_store_error,
};
