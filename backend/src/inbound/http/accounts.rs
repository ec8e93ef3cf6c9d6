//! Account API handlers.
//!
//! ```text
//! POST /api/auth/register {"username":"alice","email":"a@x.com","password":"secret1"}
//! POST /api/auth/login {"email":"a@x.com","password":"secret1"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    AuthenticatedAccount, CredentialValidationError, Error, LoginCredentials, RegistrationDetails,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Registration request body for `POST /api/auth/register`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl TryFrom<RegisterRequest> for RegistrationDetails {
    type Error = CredentialValidationError;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.email, &value.password)
    }
}

/// Login request body for `POST /api/auth/login`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = CredentialValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

fn map_credential_validation_error(err: CredentialValidationError) -> Error {
    match err {
        CredentialValidationError::Username(inner) => Error::invalid_request(inner.to_string())
            .with_details(json!({ "field": "username", "code": "invalid_username" })),
        CredentialValidationError::Email(inner) => Error::invalid_request(inner.to_string())
            .with_details(json!({ "field": "email", "code": "invalid_email" })),
        CredentialValidationError::EmptyPassword => {
            Error::invalid_request("password must not be empty")
                .with_details(json!({ "field": "password", "code": "empty_password" }))
        }
        CredentialValidationError::PasswordTooShort { min } => {
            Error::invalid_request(format!("password must be at least {min} characters"))
                .with_details(json!({ "field": "password", "code": "password_too_short" }))
        }
    }
}

/// Create an account and return its profile with a fresh session token.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthenticatedAccount),
        (status = 400, description = "Invalid or duplicate identity", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let details = RegistrationDetails::try_from(payload.into_inner())
        .map_err(map_credential_validation_error)?;
    let account = state.accounts.register(details).await?;
    Ok(HttpResponse::Created().json(account))
}

/// Authenticate credentials and return the profile with a fresh token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthenticatedAccount),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_credential_validation_error)?;
    let account = state.accounts.login(credentials).await?;
    Ok(HttpResponse::Ok().json(account))
}
