//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{predictions, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new account records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the predictions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = predictions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PredictionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub features: serde_json::Value,
    pub prediction: f64,
    pub interval_lower: f64,
    pub interval_upper: f64,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new prediction records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = predictions)]
pub(crate) struct NewPredictionRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub features: &'a serde_json::Value,
    pub prediction: f64,
    pub interval_lower: f64,
    pub interval_upper: f64,
    pub created_at: DateTime<Utc>,
}
