//! User API handlers.
//!
//! ```text
//! GET /api/users/me
//! ```

use actix_web::{get, web};

use crate::domain::{Error, UserProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedCaller;
use crate::inbound::http::state::HttpState;

/// The authenticated caller's own profile.
///
/// Looked up fresh from the store rather than echoed from token claims, so a
/// deleted account stops resolving even while its token is still unexpired.
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Caller profile", body = UserProfile),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Account no longer exists", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn me(
    caller: AuthenticatedCaller,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<UserProfile>> {
    let profile = state.accounts.profile(caller.context().subject()).await?;
    Ok(web::Json(profile))
}
