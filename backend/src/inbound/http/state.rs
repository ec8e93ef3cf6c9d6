//! Shared application state injected into HTTP handlers.

use std::sync::Arc;

use crate::domain::{AccountService, PredictionService, TokenIssuer};

/// Aggregated dependencies the HTTP layer needs.
///
/// Stored in Actix `web::Data`, so cloning is cheap; every field is either a
/// service over `Arc`'d ports or an `Arc` itself.
#[derive(Clone)]
pub struct HttpState {
    /// Registration, login, and profile use-cases.
    pub accounts: AccountService,
    /// Scoring and listing use-cases.
    pub predictions: PredictionService,
    /// Verifier for presented bearer tokens.
    pub tokens: Arc<TokenIssuer>,
}

impl HttpState {
    /// Bundle the services the handlers depend on.
    pub fn new(
        accounts: AccountService,
        predictions: PredictionService,
        tokens: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            accounts,
            predictions,
            tokens,
        }
    }
}
