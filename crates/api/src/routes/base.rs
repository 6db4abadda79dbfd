//! Root health/echo handlers.

use std::sync::Arc;

use serde_json::Value;

use gradebook_core::ApiResult;

use crate::context::{RequestContext, ResponseObject};
use crate::router::RouteBundle;
use crate::state::AppState;

pub fn bundle() -> RouteBundle {
    RouteBundle::new("/").get("/", get).post("/", post)
}

async fn get(_state: Arc<AppState>, _ctx: RequestContext) -> ApiResult<ResponseObject> {
    Ok(ResponseObject::new().add_body("message", "Hello, from GET"))
}

async fn post(_state: Arc<AppState>, ctx: RequestContext) -> ApiResult<ResponseObject> {
    Ok(ResponseObject::new()
        .add_body("message", "Hello, from POST")
        .add_body("POSTED", Value::Object(ctx.body().clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{RawBody, RawRequest};
    use gradebook_core::AppConfig;
    use serde_json::json;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(AppConfig::from_env()))
    }

    #[tokio::test]
    async fn post_echoes_the_body() {
        let ctx = RequestContext::new(RawRequest {
            path: Some("/".to_string()),
            method: Some("POST".to_string()),
            body: RawBody::Json(json!({"hello": "world"})),
            ..RawRequest::default()
        })
        .unwrap();

        let res = post(test_state(), ctx).await.unwrap();
        assert_eq!(res.body()["POSTED"]["hello"], "world");
    }
}
