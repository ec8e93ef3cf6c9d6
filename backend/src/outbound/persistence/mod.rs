//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel row structs and
//! domain types; no business logic lives here. Row structs (`models.rs`) and
//! the schema definitions (`schema.rs`) are internal implementation details
//! never exposed to the domain layer. Connections come from a `bb8` pool via
//! `diesel-async`.

mod diesel_prediction_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_prediction_repository::DieselPredictionRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
