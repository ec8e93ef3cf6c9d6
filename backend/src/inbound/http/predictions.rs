//! Prediction API handlers.
//!
//! ```text
//! POST /api/predict {"sqft": 2000, "beds": 3}
//! GET /api/predict/mine
//! GET /api/predict/all        (admin only)
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::Serialize;

use crate::domain::{
    Error, FeatureVector, PredictionRecord, PredictionSummary, PredictionWithOwner,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedCaller;
use crate::inbound::http::state::HttpState;

/// Response envelope for the caller-scoped listing.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MyPredictionsResponse {
    pub predictions: Vec<PredictionRecord>,
    pub summary: PredictionSummary,
}

/// Response envelope for the admin-wide listing.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllPredictionsResponse {
    pub predictions: Vec<PredictionWithOwner>,
    pub summary: PredictionSummary,
}

/// Score a feature vector and persist the result for the caller.
#[utoipa::path(
    post,
    path = "/api/predict",
    request_body = FeatureVector,
    responses(
        (status = 201, description = "Prediction stored", body = PredictionRecord),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Scoring or storage failure", body = Error)
    ),
    tags = ["predictions"],
    operation_id = "predict"
)]
#[post("/predict")]
pub async fn predict(
    caller: AuthenticatedCaller,
    state: web::Data<HttpState>,
    payload: web::Json<FeatureVector>,
) -> ApiResult<HttpResponse> {
    let record = state
        .predictions
        .predict(caller.context(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(record))
}

/// The caller's own predictions, newest-first, with summary statistics.
#[utoipa::path(
    get,
    path = "/api/predict/mine",
    responses(
        (status = 200, description = "Caller's predictions", body = MyPredictionsResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["predictions"],
    operation_id = "listMyPredictions"
)]
#[get("/predict/mine")]
pub async fn list_mine(
    caller: AuthenticatedCaller,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<MyPredictionsResponse>> {
    let listing = state.predictions.list_mine(caller.context()).await?;
    Ok(web::Json(MyPredictionsResponse {
        predictions: listing.records,
        summary: listing.summary,
    }))
}

/// Every prediction with owner identity, newest-first. Admin only.
#[utoipa::path(
    get,
    path = "/api/predict/all",
    responses(
        (status = 200, description = "All predictions", body = AllPredictionsResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["predictions"],
    operation_id = "listAllPredictions"
)]
#[get("/predict/all")]
pub async fn list_all(
    caller: AuthenticatedCaller,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<AllPredictionsResponse>> {
    let listing = state.predictions.list_all(caller.context()).await?;
    Ok(web::Json(AllPredictionsResponse {
        predictions: listing.records,
        summary: listing.summary,
    }))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::inbound::http::test_utils::{FailingEngine, TestBackend, register_account};
    use actix_web::http::{StatusCode, header};
    use actix_web::test as actix_test;
    use serde_json::{Value, json};
    use std::sync::Arc;

    async fn init(
        backend: &TestBackend,
    ) -> impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    > {
        actix_test::init_service(backend.app_builder().service(
            web::scope("/api")
                .service(predict)
                .service(list_mine)
                .service(list_all),
        ))
        .await
    }

    fn bearer(token: &str) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {token}"))
    }

    async fn submit(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        token: &str,
        features: Value,
    ) -> actix_web::dev::ServiceResponse {
        actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/predict")
                .insert_header(bearer(token))
                .set_json(&features)
                .to_request(),
        )
        .await
    }

    #[actix_web::test]
    async fn predict_stores_and_returns_the_record() {
        let backend = TestBackend::new();
        let app = init(&backend).await;
        let alice = register_account(&backend, "alice", "a@x.com").await;

        let response = submit(&app, &alice.token, json!({"sqft": 2000, "beds": 3})).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = actix_test::read_body(response).await;
        let value: Value = serde_json::from_slice(&body).expect("response JSON");
        assert_eq!(value["prediction"], json!(450_000.0));
        assert_eq!(value["intervalLower"], json!(420_000.0));
        assert_eq!(value["intervalUpper"], json!(480_000.0));
        assert_eq!(value["features"], json!({"sqft": 2000, "beds": 3}));
        assert_eq!(
            value.get("userId").and_then(Value::as_str),
            Some(alice.profile.id.to_string().as_str())
        );
    }

    #[actix_web::test]
    async fn mine_only_shows_the_callers_records() {
        let backend = TestBackend::new();
        let app = init(&backend).await;
        let alice = register_account(&backend, "alice", "a@x.com").await;
        let bob = register_account(&backend, "bob", "b@x.com").await;

        submit(&app, &alice.token, json!({"sqft": 2000})).await;

        let mine = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/predict/mine")
                .insert_header(bearer(&alice.token))
                .to_request(),
        )
        .await;
        assert_eq!(mine.status(), StatusCode::OK);
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(mine).await).expect("response JSON");
        assert_eq!(value["predictions"].as_array().map(Vec::len), Some(1));
        assert_eq!(value["summary"]["count"], json!(1));
        assert_eq!(value["summary"]["meanPrediction"], json!(450_000.0));

        let bobs = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/predict/mine")
                .insert_header(bearer(&bob.token))
                .to_request(),
        )
        .await;
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(bobs).await).expect("response JSON");
        assert_eq!(value["predictions"].as_array().map(Vec::len), Some(0));
        assert_eq!(value["summary"]["count"], json!(0));
        // An empty sequence has no mean at all.
        assert!(value["summary"].get("meanPrediction").is_none());
    }

    #[actix_web::test]
    async fn all_requires_the_admin_role() {
        let backend = TestBackend::new();
        let app = init(&backend).await;
        let alice = register_account(&backend, "alice", "a@x.com").await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/predict/all")
                .insert_header(bearer(&alice.token))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn all_annotates_owners_and_summarises_for_admins() {
        let backend = TestBackend::new();
        let app = init(&backend).await;
        let alice = register_account(&backend, "alice", "a@x.com").await;
        let bob = register_account(&backend, "bob", "b@x.com").await;
        let admin = backend.create_admin("root", "admin@x.com").await;

        submit(&app, &alice.token, json!({"sqft": 2000})).await;
        submit(&app, &bob.token, json!({"sqft": 3000})).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/predict/all")
                .insert_header(bearer(&admin.token))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("response JSON");
        let predictions = value["predictions"].as_array().expect("array");
        assert_eq!(predictions.len(), 2);
        // Newest first.
        assert_eq!(
            predictions[0].pointer("/owner/username").and_then(Value::as_str),
            Some("bob")
        );
        assert_eq!(
            predictions[1].pointer("/owner/username").and_then(Value::as_str),
            Some("alice")
        );
        assert_eq!(value["summary"]["count"], json!(2));
        assert_eq!(value["summary"]["distinctOwners"], json!(2));
    }

    #[actix_web::test]
    async fn missing_token_is_unauthorised() {
        let backend = TestBackend::new();
        let app = init(&backend).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/predict")
                .set_json(&json!({"sqft": 2000}))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn scoring_failure_is_a_redacted_server_error_and_stores_nothing() {
        let backend = TestBackend::with_engine(Arc::new(FailingEngine));
        let app = init(&backend).await;
        let alice = register_account(&backend, "alice", "a@x.com").await;

        let response = submit(&app, &alice.token, json!({"sqft": 2000})).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("error payload");
        assert_eq!(
            value.get("message").and_then(Value::as_str),
            Some("Internal server error")
        );

        let mine = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/predict/mine")
                .insert_header(bearer(&alice.token))
                .to_request(),
        )
        .await;
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(mine).await).expect("response JSON");
        assert_eq!(value["summary"]["count"], json!(0));
    }
}
