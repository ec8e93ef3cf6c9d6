//! Prediction use-cases: scoring, persistence, and scoped listing.
//!
//! The service proxies feature vectors to the external scoring engine,
//! persists successful outcomes, and answers the caller-scoped and
//! admin-wide listing queries together with their derived summaries.

use std::sync::Arc;

use super::auth::CallerContext;
use super::ports::{
    PredictionRepository, ScoringEngine, ScoringEngineError, map_prediction_store_error,
};
use super::prediction::{
    FeatureVector, PredictionRecord, PredictionSummary, PredictionWithOwner,
};
use super::user::Role;
use super::Error;

/// Caller-scoped listing: records plus their derived summary.
#[derive(Debug, Clone)]
pub struct OwnedPredictions {
    pub records: Vec<PredictionRecord>,
    pub summary: PredictionSummary,
}

/// Admin-wide listing: owner-annotated records plus their derived summary.
#[derive(Debug, Clone)]
pub struct AllPredictions {
    pub records: Vec<PredictionWithOwner>,
    pub summary: PredictionSummary,
}

/// Prediction use-case service over the scoring engine and record store.
#[derive(Clone)]
pub struct PredictionService {
    engine: Arc<dyn ScoringEngine>,
    records: Arc<dyn PredictionRepository>,
}

impl PredictionService {
    /// Create a service over the given engine and store.
    pub fn new(engine: Arc<dyn ScoringEngine>, records: Arc<dyn PredictionRepository>) -> Self {
        Self { engine, records }
    }

    /// Score a feature vector for the caller and persist the outcome.
    ///
    /// A failed scoring call leaves no record behind; the stored history
    /// only ever contains completed estimates.
    pub async fn predict(
        &self,
        ctx: &CallerContext,
        features: FeatureVector,
    ) -> Result<PredictionRecord, Error> {
        let outcome = self
            .engine
            .score(&features)
            .await
            .map_err(map_scoring_error)?;

        if !outcome.is_consistent() {
            // Stored and returned verbatim; the bounds are the engine's to get right.
            tracing::warn!(
                prediction = outcome.prediction,
                interval_lower = outcome.interval_lower,
                interval_upper = outcome.interval_upper,
                "scoring engine returned inconsistent interval bounds"
            );
        }

        let record = self
            .records
            .save(ctx.subject(), features, outcome)
            .await
            .map_err(map_prediction_store_error)?;
        tracing::info!(prediction_id = %record.id, user_id = %record.user_id, "prediction stored");
        Ok(record)
    }

    /// The caller's own records, newest-first, with their summary.
    pub async fn list_mine(&self, ctx: &CallerContext) -> Result<OwnedPredictions, Error> {
        let records = self
            .records
            .find_by_owner(ctx.subject())
            .await
            .map_err(map_prediction_store_error)?;
        let summary = PredictionSummary::of_records(&records);
        Ok(OwnedPredictions { records, summary })
    }

    /// Every record with owner identity, newest-first. Admin only.
    pub async fn list_all(&self, ctx: &CallerContext) -> Result<AllPredictions, Error> {
        ctx.require_role(Role::Admin)?;
        let records = self
            .records
            .find_all_with_owners()
            .await
            .map_err(map_prediction_store_error)?;
        let summary = PredictionSummary::of_owned(&records);
        Ok(AllPredictions { records, summary })
    }
}

/// Scoring failures surface to callers as an opaque server error; the
/// specific failure mode stays in the logs.
fn map_scoring_error(error: ScoringEngineError) -> Error {
    tracing::error!(error = %error, "scoring request failed");
    Error::internal(error.to_string())
}
