//! Builders wiring ports into the shared HTTP state.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{
    InMemoryPredictionRepository, InMemoryUserRepository, PredictionRepository, ScoringEngine,
    UserRepository,
};
use crate::domain::{AccountService, PredictionService, TokenIssuer};
use crate::inbound::http::HttpState;
use crate::outbound::persistence::{DieselPredictionRepository, DieselUserRepository};
use crate::outbound::scoring::HttpScoringEngine;

use super::ServerConfig;

/// Select database-backed stores when a pool is configured, otherwise fall
/// back to in-memory ones for local runs and tests.
fn build_stores(
    config: &ServerConfig,
) -> (Arc<dyn UserRepository>, Arc<dyn PredictionRepository>) {
    match &config.db_pool {
        Some(pool) => (
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselPredictionRepository::new(pool.clone())),
        ),
        None => {
            let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
            let records = Arc::new(InMemoryPredictionRepository::new(Arc::clone(&users)));
            (users, records)
        }
    }
}

/// Build the shared HTTP state from configured ports.
///
/// # Errors
///
/// Returns [`std::io::Error`] when the scoring engine HTTP client cannot be
/// constructed.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let engine: Arc<dyn ScoringEngine> = Arc::new(
        HttpScoringEngine::new(config.scoring_url.clone(), config.scoring_timeout)
            .map_err(|err| std::io::Error::other(format!("scoring client init failed: {err}")))?,
    );

    let tokens = Arc::new(TokenIssuer::new(&config.token));
    let (users, records) = build_stores(config);
    let accounts = AccountService::new(users, Arc::clone(&tokens));
    let predictions = PredictionService::new(engine, records);

    Ok(web::Data::new(HttpState::new(accounts, predictions, tokens)))
}
