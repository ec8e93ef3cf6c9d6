//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; regenerate
//! with `diesel print-schema` after a migration changes the schema.

diesel::table! {
    /// Registered accounts with credentials and role.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique handle (3-32 characters).
        username -> Varchar,
        /// Unique email address, stored case-sensitively.
        email -> Varchar,
        /// Argon2id PHC hash of the account password.
        password_hash -> Text,
        /// Access role name (`standard` or `admin`).
        role -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Immutable scoring results, one row per completed prediction.
    predictions (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning account.
        user_id -> Uuid,
        /// Feature vector exactly as submitted.
        features -> Jsonb,
        /// Point estimate from the scoring engine.
        prediction -> Float8,
        /// Lower conformal interval bound.
        interval_lower -> Float8,
        /// Upper conformal interval bound.
        interval_upper -> Float8,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(predictions -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(predictions, users);
