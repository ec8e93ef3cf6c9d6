//! Port abstraction for the prediction store and its errors.
//!
//! Records are append-only: `save` assigns the identifier and timestamp, and
//! nothing ever updates or deletes a stored record. Both read operations
//! return newest-first sequences; `find_all_with_owners` joins each record to
//! its owner's public identity at read time.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::prediction::{
    FeatureVector, PredictionRecord, PredictionWithOwner, ScoringOutcome,
};
use crate::domain::user::{UserId, UserProfile};
use crate::domain::Error;

/// Persistence errors raised by prediction store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictionStoreError {
    /// Store connection could not be established.
    #[error("prediction store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("prediction store query failed: {message}")]
    Query { message: String },
}

impl PredictionStoreError {
    /// Connection failure constructor.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Query failure constructor.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Map storage failures to transport-agnostic domain errors.
pub fn map_prediction_store_error(error: PredictionStoreError) -> Error {
    match error {
        PredictionStoreError::Connection { message } => Error::service_unavailable(message),
        PredictionStoreError::Query { message } => Error::internal(message),
    }
}

/// Driven port for prediction persistence.
#[async_trait]
pub trait PredictionRepository: Send + Sync {
    /// Append one immutable record; assigns its id and creation timestamp.
    async fn save(
        &self,
        owner: &UserId,
        features: FeatureVector,
        outcome: ScoringOutcome,
    ) -> Result<PredictionRecord, PredictionStoreError>;

    /// All records owned by `owner`, newest-first.
    async fn find_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<PredictionRecord>, PredictionStoreError>;

    /// Every record in the store, newest-first, annotated with the owner's
    /// public identity.
    async fn find_all_with_owners(
        &self,
    ) -> Result<Vec<PredictionWithOwner>, PredictionStoreError>;
}

/// Resolves owner identities for the in-memory store's read-time join.
///
/// The Diesel adapter performs this join in SQL; the in-memory store needs an
/// explicit lookup hook instead.
#[async_trait]
pub trait OwnerDirectory: Send + Sync {
    /// Public identity for a user id, if the account exists.
    async fn profile_of(&self, id: &UserId) -> Result<Option<UserProfile>, PredictionStoreError>;
}

#[async_trait]
impl OwnerDirectory for std::sync::Arc<dyn super::UserRepository> {
    async fn profile_of(&self, id: &UserId) -> Result<Option<UserProfile>, PredictionStoreError> {
        self.find_by_id(id)
            .await
            .map(|maybe| maybe.map(|user| user.profile()))
            .map_err(|err| PredictionStoreError::query(err.to_string()))
    }
}

/// In-memory prediction store for tests and database-less development runs.
pub struct InMemoryPredictionRepository<D> {
    records: Mutex<Vec<PredictionRecord>>,
    owners: D,
}

impl<D: OwnerDirectory> InMemoryPredictionRepository<D> {
    /// Create an empty store joining owners through `owners`.
    pub fn new(owners: D) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            owners,
        }
    }
}

#[async_trait]
impl<D: OwnerDirectory> PredictionRepository for InMemoryPredictionRepository<D> {
    async fn save(
        &self,
        owner: &UserId,
        features: FeatureVector,
        outcome: ScoringOutcome,
    ) -> Result<PredictionRecord, PredictionStoreError> {
        let record = PredictionRecord {
            id: Uuid::new_v4(),
            user_id: *owner,
            features,
            prediction: outcome.prediction,
            interval_lower: outcome.interval_lower,
            interval_upper: outcome.interval_upper,
            created_at: Utc::now(),
        };
        let mut records = self
            .records
            .lock()
            .map_err(|_| PredictionStoreError::query("prediction store lock poisoned"))?;
        records.push(record.clone());
        Ok(record)
    }

    async fn find_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<PredictionRecord>, PredictionStoreError> {
        let records = self
            .records
            .lock()
            .map_err(|_| PredictionStoreError::query("prediction store lock poisoned"))?;
        // Insertion order is creation order; reverse for newest-first.
        Ok(records
            .iter()
            .rev()
            .filter(|r| r.user_id == *owner)
            .cloned()
            .collect())
    }

    async fn find_all_with_owners(
        &self,
    ) -> Result<Vec<PredictionWithOwner>, PredictionStoreError> {
        let snapshot: Vec<PredictionRecord> = {
            let records = self
                .records
                .lock()
                .map_err(|_| PredictionStoreError::query("prediction store lock poisoned"))?;
            records.iter().rev().cloned().collect()
        };

        let mut annotated = Vec::with_capacity(snapshot.len());
        for record in snapshot {
            let owner = self
                .owners
                .profile_of(&record.user_id)
                .await?
                .ok_or_else(|| {
                    PredictionStoreError::query(format!(
                        "prediction {} references unknown owner {}",
                        record.id, record.user_id
                    ))
                })?;
            annotated.push(PredictionWithOwner { record, owner });
        }
        Ok(annotated)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::user::{EmailAddress, Role, Username};
    use std::collections::HashMap;

    #[derive(Default)]
    struct StubDirectory {
        profiles: HashMap<UserId, UserProfile>,
    }

    impl StubDirectory {
        fn with_user(mut self, id: UserId, username: &str) -> Self {
            self.profiles.insert(
                id,
                UserProfile {
                    id,
                    username: Username::new(username).expect("valid username"),
                    email: EmailAddress::new(format!("{username}@x.com"))
                        .expect("valid email"),
                    role: Role::Standard,
                },
            );
            self
        }
    }

    #[async_trait]
    impl OwnerDirectory for StubDirectory {
        async fn profile_of(
            &self,
            id: &UserId,
        ) -> Result<Option<UserProfile>, PredictionStoreError> {
            Ok(self.profiles.get(id).cloned())
        }
    }

    fn outcome(prediction: f64) -> ScoringOutcome {
        ScoringOutcome {
            prediction,
            interval_lower: prediction - 30_000.0,
            interval_upper: prediction + 30_000.0,
        }
    }

    fn features() -> FeatureVector {
        serde_json::from_value(serde_json::json!({"sqft": 2000, "beds": 3}))
            .expect("object deserialises")
    }

    #[tokio::test]
    async fn save_assigns_id_and_timestamp_and_round_trips_exactly() {
        let alice = UserId::random();
        let repo =
            InMemoryPredictionRepository::new(StubDirectory::default().with_user(alice, "alice"));

        let saved = repo
            .save(&alice, features(), outcome(450_000.0))
            .await
            .expect("save succeeds");

        let mine = repo.find_by_owner(&alice).await.expect("query succeeds");
        assert_eq!(mine, vec![saved.clone()]);
        assert_eq!(mine[0].features, features());
        assert_eq!(mine[0].prediction, 450_000.0);
        assert_eq!(mine[0].interval_lower, 420_000.0);
        assert_eq!(mine[0].interval_upper, 480_000.0);
    }

    #[tokio::test]
    async fn find_by_owner_is_scoped_and_newest_first() {
        let alice = UserId::random();
        let bob = UserId::random();
        let repo = InMemoryPredictionRepository::new(
            StubDirectory::default()
                .with_user(alice, "alice")
                .with_user(bob, "bob"),
        );

        let first = repo
            .save(&alice, features(), outcome(400_000.0))
            .await
            .expect("save succeeds");
        repo.save(&bob, features(), outcome(999_000.0))
            .await
            .expect("save succeeds");
        let second = repo
            .save(&alice, features(), outcome(500_000.0))
            .await
            .expect("save succeeds");

        let mine = repo.find_by_owner(&alice).await.expect("query succeeds");
        assert_eq!(mine, vec![second, first]);
    }

    #[tokio::test]
    async fn find_all_annotates_owners_newest_first() {
        let alice = UserId::random();
        let bob = UserId::random();
        let repo = InMemoryPredictionRepository::new(
            StubDirectory::default()
                .with_user(alice, "alice")
                .with_user(bob, "bob"),
        );

        repo.save(&alice, features(), outcome(400_000.0))
            .await
            .expect("save succeeds");
        repo.save(&bob, features(), outcome(600_000.0))
            .await
            .expect("save succeeds");

        let all = repo.find_all_with_owners().await.expect("query succeeds");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].owner.username.as_ref(), "bob");
        assert_eq!(all[1].owner.username.as_ref(), "alice");
    }

    #[tokio::test]
    async fn unknown_owner_in_join_is_a_query_error() {
        let unknown = UserId::random();
        let repo = InMemoryPredictionRepository::new(StubDirectory::default());
        repo.save(&unknown, features(), outcome(400_000.0))
            .await
            .expect("save succeeds");

        let err = repo
            .find_all_with_owners()
            .await
            .expect_err("dangling owner must fail");
        assert!(matches!(err, PredictionStoreError::Query { .. }));
    }
}
