//! PostgreSQL-backed `PredictionRepository` implementation using Diesel ORM.
//!
//! Records are append-only rows; the admin-wide listing joins each row to its
//! owner in SQL so owner identity is resolved at read time.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{PredictionRepository, PredictionStoreError};
use crate::domain::{
    EmailAddress, FeatureVector, PredictionRecord, PredictionWithOwner, Role, ScoringOutcome,
    UserId, UserProfile, Username,
};

use super::models::{NewPredictionRow, PredictionRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{predictions, users};

/// Diesel-backed implementation of the prediction store port.
#[derive(Clone)]
pub struct DieselPredictionRepository {
    pool: DbPool,
}

impl DieselPredictionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PredictionStoreError {
    PredictionStoreError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> PredictionStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            PredictionStoreError::connection(info.message().to_owned())
        }
        other => {
            debug!(error = %other, "diesel operation failed");
            PredictionStoreError::query(other.to_string())
        }
    }
}

/// Convert a database row into a domain prediction record.
fn row_to_record(row: PredictionRow) -> Result<PredictionRecord, PredictionStoreError> {
    let PredictionRow {
        id,
        user_id,
        features,
        prediction,
        interval_lower,
        interval_upper,
        created_at,
    } = row;

    let features: FeatureVector = serde_json::from_value(features)
        .map_err(|err| PredictionStoreError::query(format!("decode features: {err}")))?;

    Ok(PredictionRecord {
        id,
        user_id: UserId::from_uuid(user_id),
        features,
        prediction,
        interval_lower,
        interval_upper,
        created_at,
    })
}

/// Convert a joined user row into the owner's public identity.
fn row_to_profile(row: UserRow) -> Result<UserProfile, PredictionStoreError> {
    let username = Username::new(row.username)
        .map_err(|err| PredictionStoreError::query(err.to_string()))?;
    let email = EmailAddress::new(row.email)
        .map_err(|err| PredictionStoreError::query(err.to_string()))?;
    let role =
        Role::parse(&row.role).map_err(|err| PredictionStoreError::query(err.to_string()))?;

    Ok(UserProfile {
        id: UserId::from_uuid(row.id),
        username,
        email,
        role,
    })
}

#[async_trait]
impl PredictionRepository for DieselPredictionRepository {
    async fn save(
        &self,
        owner: &UserId,
        features: FeatureVector,
        outcome: ScoringOutcome,
    ) -> Result<PredictionRecord, PredictionStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let record = PredictionRecord {
            id: Uuid::new_v4(),
            user_id: *owner,
            features,
            prediction: outcome.prediction,
            interval_lower: outcome.interval_lower,
            interval_upper: outcome.interval_upper,
            created_at: Utc::now(),
        };
        let features_json = serde_json::Value::from(record.features.clone());
        let new_row = NewPredictionRow {
            id: record.id,
            user_id: *record.user_id.as_uuid(),
            features: &features_json,
            prediction: record.prediction,
            interval_lower: record.interval_lower,
            interval_upper: record.interval_upper,
            created_at: record.created_at,
        };

        diesel::insert_into(predictions::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(record)
    }

    async fn find_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<PredictionRecord>, PredictionStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<PredictionRow> = predictions::table
            .filter(predictions::user_id.eq(owner.as_uuid()))
            .order((predictions::created_at.desc(), predictions::id.desc()))
            .select(PredictionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_record).collect()
    }

    async fn find_all_with_owners(
        &self,
    ) -> Result<Vec<PredictionWithOwner>, PredictionStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(PredictionRow, UserRow)> = predictions::table
            .inner_join(users::table)
            .order((predictions::created_at.desc(), predictions::id.desc()))
            .select((PredictionRow::as_select(), UserRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|(prediction_row, user_row)| {
                Ok(PredictionWithOwner {
                    record: row_to_record(prediction_row)?,
                    owner: row_to_profile(user_row)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion.
    use super::*;
    use serde_json::json;

    fn prediction_row(features: serde_json::Value) -> PredictionRow {
        PredictionRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            features,
            prediction: 450_000.0,
            interval_lower: 420_000.0,
            interval_upper: 480_000.0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn row_features_round_trip_verbatim() {
        let source = json!({"sqft": 2000, "waterfront": true, "zipcode": "98103"});
        let record = row_to_record(prediction_row(source.clone())).expect("row converts");
        assert_eq!(serde_json::to_value(&record.features).expect("serialises"), source);
        assert_eq!(record.prediction, 450_000.0);
    }

    #[test]
    fn non_object_features_surface_as_query_errors() {
        let err = row_to_record(prediction_row(json!([1, 2, 3])))
            .expect_err("non-object features must fail");
        assert!(matches!(err, PredictionStoreError::Query { .. }));
    }

    #[test]
    fn joined_owner_row_converts_to_profile() {
        let row = UserRow {
            id: Uuid::new_v4(),
            username: "alice".to_owned(),
            email: "a@x.com".to_owned(),
            password_hash: "$argon2id$fake".to_owned(),
            role: "admin".to_owned(),
            created_at: Utc::now(),
        };
        let profile = row_to_profile(row.clone()).expect("row converts");
        assert_eq!(profile.id.as_uuid(), &row.id);
        assert_eq!(profile.role, Role::Admin);
    }

    #[test]
    fn not_found_maps_to_a_query_error() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(err, PredictionStoreError::Query { .. }));
    }
}
