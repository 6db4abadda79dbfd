//! User identity handlers.

use std::sync::Arc;

use gradebook_core::ApiResult;

use crate::authz::{self, ACCESS_TOKEN_COOKIE};
use crate::context::{RequestContext, ResponseObject};
use crate::router::RouteBundle;
use crate::state::AppState;

pub fn bundle() -> RouteBundle {
    RouteBundle::new("/user").get("/get-user-data", get_user_data)
}

/// Current-user lookup.
///
/// A missing cookie is NOT an error here: the frontend probes this endpoint
/// to decide whether to show the login button, so it answers 200 with a
/// message instead of 401. An invalid token still fails.
async fn get_user_data(state: Arc<AppState>, ctx: RequestContext) -> ApiResult<ResponseObject> {
    if ctx.cookie(ACCESS_TOKEN_COOKIE).is_none() {
        return Ok(ResponseObject::new().add_body("message", "Not logged in"));
    }

    let claims = authz::require_claims(&ctx)?;
    let user = authz::resolve_user(&state, &claims).await?;

    Ok(ResponseObject::new()
        .add_body("id", user.id.as_i64())
        .add_body("oid", user.oid)
        .add_body("username", user.username)
        .add_body("email", user.email))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RawRequest;
    use gradebook_core::AppConfig;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(AppConfig::from_env()))
    }

    fn ctx(cookies: Vec<String>) -> RequestContext {
        RequestContext::new(RawRequest {
            path: Some("/user/get-user-data".to_string()),
            method: Some("GET".to_string()),
            cookies,
            ..RawRequest::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn no_cookie_is_ok_with_message() {
        let res = get_user_data(test_state(), ctx(vec![])).await.unwrap();
        assert_eq!(res.status(), 200);
        assert_eq!(res.body()["message"], "Not logged in");
    }

    #[tokio::test]
    async fn invalid_token_still_fails() {
        let err = get_user_data(test_state(), ctx(vec!["accessToken=junk".to_string()]))
            .await
            .unwrap_err();
        assert_eq!(err.status(), 401);
    }
}
