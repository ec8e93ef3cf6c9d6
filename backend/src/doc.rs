//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: All HTTP endpoints from the inbound layer (auth, predictions,
//!   users, health)
//! - **Schemas**: Request and response bodies, including the shared
//!   [`Error`](crate::domain::Error) envelope
//! - **Security**: Bearer token authentication scheme
//!
//! The generated specification backs Swagger UI in debug builds.

use crate::domain::{
    AuthenticatedAccount, Error, ErrorCode, FeatureVector, PredictionRecord, PredictionSummary,
    PredictionWithOwner, UserProfile,
};
use crate::inbound::http::accounts::{LoginRequest, RegisterRequest};
use crate::inbound::http::predictions::{AllPredictionsResponse, MyPredictionsResponse};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Token issued by POST /api/auth/register or POST /api/auth/login.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Hometrix backend API",
        description = "HTTP interface for house price estimation: account \
                       management, scoring proxy, and prediction history."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::predictions::predict,
        crate::inbound::http::predictions::list_mine,
        crate::inbound::http::predictions::list_all,
        crate::inbound::http::users::me,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        RegisterRequest,
        LoginRequest,
        AuthenticatedAccount,
        UserProfile,
        FeatureVector,
        PredictionRecord,
        PredictionWithOwner,
        PredictionSummary,
        MyPredictionsResponse,
        AllPredictionsResponse,
    )),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "predictions", description = "Scoring and prediction history"),
        (name = "users", description = "Account profile access"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
