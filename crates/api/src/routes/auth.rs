//! Login flow against the external identity provider.

use std::sync::Arc;

use gradebook_core::{ApiError, ApiResult};

use crate::authz::ACCESS_TOKEN_COOKIE;
use crate::context::{RequestContext, ResponseCookie, ResponseObject};
use crate::router::RouteBundle;
use crate::state::AppState;

const TOKEN_COOKIE_MAX_AGE: i64 = 24 * 60 * 60;

pub fn bundle() -> RouteBundle {
    RouteBundle::new("/auth")
        .get("/login", login)
        .get("/loginCallback", login_callback)
        .get("/logout", logout)
}

/// Send the browser to the provider's authorize endpoint.
async fn login(state: Arc<AppState>, _ctx: RequestContext) -> ApiResult<ResponseObject> {
    let nonce = uuid::Uuid::new_v4().to_string();
    let url = state.oauth.authorize_url(&nonce)?;
    Ok(ResponseObject::new().redirect(url))
}

/// Exchange the authorization code, set the token cookie, bounce to the
/// frontend.
async fn login_callback(state: Arc<AppState>, ctx: RequestContext) -> ApiResult<ResponseObject> {
    let code = ctx
        .query_param("code")
        .ok_or_else(|| ApiError::bad_request("Missing code parameter"))?;

    let access_token = state.oauth.exchange_code(code).await?;

    Ok(ResponseObject::new()
        .add_cookie(
            ResponseCookie::new(ACCESS_TOKEN_COOKIE, access_token)
                .max_age(TOKEN_COOKIE_MAX_AGE)
                .path("/"),
        )
        .redirect(&state.config.web_domain))
}

/// Clear the token cookie and bounce to the frontend.
async fn logout(state: Arc<AppState>, _ctx: RequestContext) -> ApiResult<ResponseObject> {
    Ok(ResponseObject::new()
        .add_cookie(ResponseCookie::new(ACCESS_TOKEN_COOKIE, "").max_age(0).path("/"))
        .redirect(&state.config.web_domain))
}
