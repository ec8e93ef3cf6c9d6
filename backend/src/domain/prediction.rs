//! Prediction model: submitted feature vectors, persisted scoring results,
//! and read-time summary statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::{UserId, UserProfile};

/// Property attributes submitted for scoring.
///
/// ## Invariants
/// - Semantically opaque: the payload is forwarded to the scoring engine
///   verbatim and persisted verbatim. The only structural requirement is
///   that it is a JSON object; no schema is imposed on keys or values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object, example = json!({"sqft": 2000, "beds": 3}))]
pub struct FeatureVector(Map<String, Value>);

impl FeatureVector {
    /// Wrap an already-parsed JSON object.
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self(attributes)
    }

    /// Borrow the underlying attribute map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Number of submitted attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the submission carries no attributes at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<FeatureVector> for Value {
    fn from(value: FeatureVector) -> Self {
        Self::Object(value.0)
    }
}

/// Point estimate and conformal interval returned by the scoring engine.
///
/// `interval_lower <= prediction <= interval_upper` is expected from the
/// engine but deliberately not enforced here; the proxy logs inconsistent
/// responses and stores them as received.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringOutcome {
    pub prediction: f64,
    pub interval_lower: f64,
    pub interval_upper: f64,
}

impl ScoringOutcome {
    /// Whether the bounds bracket the point estimate.
    pub fn is_consistent(&self) -> bool {
        self.interval_lower <= self.prediction && self.prediction <= self.interval_upper
    }
}

/// Persisted result of one completed scoring call.
///
/// Immutable once created: records are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    /// Unique record identifier assigned at save time.
    #[schema(value_type = String, example = "5c0f7a2e-0000-4000-8000-000000000000")]
    pub id: Uuid,
    /// Owning user.
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub user_id: UserId,
    /// Feature vector exactly as submitted.
    pub features: FeatureVector,
    /// Point estimate from the scoring engine.
    pub prediction: f64,
    /// Lower conformal interval bound.
    pub interval_lower: f64,
    /// Upper conformal interval bound.
    pub interval_upper: f64,
    /// Creation timestamp assigned at save time.
    pub created_at: DateTime<Utc>,
}

/// Prediction record annotated with its owner's public identity.
///
/// The join happens at read time; owner fields are never stored redundantly
/// next to the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictionWithOwner {
    #[serde(flatten)]
    pub record: PredictionRecord,
    /// Public identity of the owning user.
    pub owner: UserProfile,
}

/// Aggregate statistics derived from one returned sequence of predictions.
///
/// Pure function of the sequence: recomputed on every fetch, never cached or
/// persisted. Mirrors the numbers the dashboards display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictionSummary {
    /// Total records in the sequence.
    pub count: u64,
    /// Arithmetic mean of the point estimates; absent for an empty sequence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_prediction: Option<f64>,
    /// Number of distinct owning users.
    pub distinct_owners: u64,
}

impl PredictionSummary {
    fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a UserId, f64)>,
    {
        let mut count: u64 = 0;
        let mut sum = 0.0_f64;
        let mut owners: HashSet<&UserId> = HashSet::new();
        for (owner, prediction) in pairs {
            count += 1;
            sum += prediction;
            owners.insert(owner);
        }
        let mean_prediction = if count == 0 {
            None
        } else {
            // u64 -> f64 is exact for any realistic record count.
            Some(sum / count as f64)
        };
        Self {
            count,
            mean_prediction,
            distinct_owners: owners.len() as u64,
        }
    }

    /// Summarise an owner-scoped sequence.
    pub fn of_records(records: &[PredictionRecord]) -> Self {
        Self::from_pairs(records.iter().map(|r| (&r.user_id, r.prediction)))
    }

    /// Summarise an owner-annotated sequence.
    pub fn of_owned(records: &[PredictionWithOwner]) -> Self {
        Self::from_pairs(
            records
                .iter()
                .map(|r| (&r.record.user_id, r.record.prediction)),
        )
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn record(owner: UserId, prediction: f64) -> PredictionRecord {
        PredictionRecord {
            id: Uuid::new_v4(),
            user_id: owner,
            features: features(json!({"sqft": 2000})),
            prediction,
            interval_lower: prediction - 1000.0,
            interval_upper: prediction + 1000.0,
            created_at: Utc::now(),
        }
    }

    fn features(value: Value) -> FeatureVector {
        serde_json::from_value(value).expect("object deserialises")
    }

    #[test]
    fn feature_vector_accepts_mixed_value_types() {
        let fv = features(json!({"sqft": 2000, "waterfront": true, "zipcode": "98103"}));
        assert_eq!(fv.len(), 3);
        assert_eq!(fv.as_map()["waterfront"], json!(true));
    }

    #[test]
    fn feature_vector_rejects_non_objects() {
        assert!(serde_json::from_value::<FeatureVector>(json!([1, 2, 3])).is_err());
        assert!(serde_json::from_value::<FeatureVector>(json!("sqft")).is_err());
    }

    #[test]
    fn feature_vector_round_trips_verbatim() {
        let source = json!({"sqft": 2000.5, "beds": 3, "view": false});
        let fv = features(source.clone());
        assert_eq!(serde_json::to_value(&fv).expect("serialises"), source);
    }

    #[rstest]
    #[case(420_000.0, 450_000.0, 480_000.0, true)]
    #[case(450_000.0, 450_000.0, 450_000.0, true)]
    #[case(460_000.0, 450_000.0, 480_000.0, false)]
    #[case(420_000.0, 490_000.0, 480_000.0, false)]
    fn outcome_consistency_check(
        #[case] lower: f64,
        #[case] prediction: f64,
        #[case] upper: f64,
        #[case] expected: bool,
    ) {
        let outcome = ScoringOutcome {
            prediction,
            interval_lower: lower,
            interval_upper: upper,
        };
        assert_eq!(outcome.is_consistent(), expected);
    }

    #[test]
    fn summary_of_empty_sequence_has_no_mean() {
        let summary = PredictionSummary::of_records(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean_prediction, None);
        assert_eq!(summary.distinct_owners, 0);
    }

    #[test]
    fn summary_counts_mean_and_distinct_owners() {
        let alice = UserId::random();
        let bob = UserId::random();
        let records = vec![
            record(alice, 400_000.0),
            record(alice, 500_000.0),
            record(bob, 600_000.0),
        ];

        let summary = PredictionSummary::of_records(&records);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.mean_prediction, Some(500_000.0));
        assert_eq!(summary.distinct_owners, 2);
    }

    #[test]
    fn record_serialises_to_camel_case() {
        let value =
            serde_json::to_value(record(UserId::random(), 450_000.0)).expect("serialises");
        assert!(value.get("intervalLower").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("interval_lower").is_none());
    }
}
