//! Bearer-token authentication for HTTP handlers.
//!
//! Handlers declare an [`AuthenticatedCaller`] parameter to require a valid
//! token; extraction failures become `401 Unauthorized` before the handler
//! body runs. Role checks stay in the domain services, not here.

use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use std::future::{Ready, ready};

use crate::domain::{CallerContext, Error};
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Verified caller identity extracted from the `Authorization` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedCaller(pub CallerContext);

impl AuthenticatedCaller {
    /// The verified caller context.
    pub fn context(&self) -> &CallerContext {
        &self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, Error> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("authorization header is not valid text"))?;
    value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("authorization header must use the Bearer scheme"))
}

fn verify_caller(req: &HttpRequest) -> Result<AuthenticatedCaller, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("application state is not configured"))?;
    let token = bearer_token(req)?;
    let context = state.tokens.verify(token).map_err(|err| {
        tracing::debug!(error = %err, "token verification failed");
        Error::unauthorized(err.to_string())
    })?;
    Ok(AuthenticatedCaller(context))
}

impl FromRequest for AuthenticatedCaller {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(verify_caller(req))
    }
}
