//! Path-segment dispatch.
//!
//! The first segment of a request path selects a `RouteBundle`; the
//! remaining segment (at most one) plus the method selects a handler inside
//! it. A bundle invoked with a foreign prefix is a wiring bug and fails
//! internal, not as a client error.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use gradebook_core::{ApiError, ApiResult};

use crate::context::{RequestContext, ResponseObject};
use crate::state::AppState;

type HandlerFuture = Pin<Box<dyn Future<Output = ApiResult<ResponseObject>> + Send>>;
type Handler = Box<dyn Fn(Arc<AppState>, RequestContext) -> HandlerFuture + Send + Sync>;

/// Method-keyed handler maps for one top-level resource prefix.
pub struct RouteBundle {
    prefix: &'static str,
    get_handlers: HashMap<&'static str, Handler>,
    post_handlers: HashMap<&'static str, Handler>,
}

impl RouteBundle {
    pub fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            get_handlers: HashMap::new(),
            post_handlers: HashMap::new(),
        }
    }

    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    pub fn get<F, Fut>(mut self, subpath: &'static str, handler: F) -> Self
    where
        F: Fn(Arc<AppState>, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<ResponseObject>> + Send + 'static,
    {
        self.get_handlers
            .insert(subpath, Box::new(move |state, ctx| Box::pin(handler(state, ctx))));
        self
    }

    pub fn post<F, Fut>(mut self, subpath: &'static str, handler: F) -> Self
    where
        F: Fn(Arc<AppState>, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<ResponseObject>> + Send + 'static,
    {
        self.post_handlers
            .insert(subpath, Box::new(move |state, ctx| Box::pin(handler(state, ctx))));
        self
    }

    /// Dispatch within this bundle.
    pub async fn handle(
        &self,
        state: Arc<AppState>,
        ctx: RequestContext,
    ) -> ApiResult<ResponseObject> {
        let parts = ctx.path_parts();

        if parts.first().map(String::as_str) != Some(self.prefix) {
            return Err(ApiError::internal(format!(
                "bundle {} invoked for path {}",
                self.prefix,
                ctx.path()
            )));
        }

        // Only one level below the prefix is routable.
        if parts.len() > 2 {
            return Err(ApiError::not_found("Route path not found"));
        }

        let subpath = parts.get(1).map(String::as_str).unwrap_or("/");

        let table = match ctx.method() {
            "GET" => &self.get_handlers,
            "POST" => &self.post_handlers,
            _ => return Err(ApiError::not_found("Route handler not found")),
        };

        match table.get(subpath) {
            Some(handler) => handler(state, ctx).await,
            None => Err(ApiError::not_found("Route handler not found")),
        }
    }
}

/// Top-level router over registered bundles.
pub struct Router {
    bundles: HashMap<&'static str, RouteBundle>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self {
            bundles: HashMap::new(),
        }
    }

    pub fn register(mut self, bundle: RouteBundle) -> Self {
        self.bundles.insert(bundle.prefix(), bundle);
        self
    }

    /// Dispatch a request, turning every failure into an error response.
    pub async fn dispatch(&self, state: Arc<AppState>, ctx: RequestContext) -> ResponseObject {
        tracing::info!(path = ctx.path(), method = ctx.method(), "handling request");

        let prefix = ctx.path_parts().first().cloned().unwrap_or_default();
        let result = match self.bundles.get(prefix.as_str()) {
            Some(bundle) => bundle.handle(state, ctx).await,
            None => Err(ApiError::not_found("Route not found")),
        };

        match result {
            Ok(response) => response,
            Err(err) => error_response(&err),
        }
    }
}

/// Build the error response for a failed request.
///
/// Client-tier messages pass through; internal detail is logged and replaced
/// with a generic message.
pub fn error_response(err: &ApiError) -> ResponseObject {
    if err.status() >= 500 {
        tracing::error!(detail = err.detail(), "request failed");
    } else {
        tracing::info!(status = err.status(), reason = err.client_message(), "request rejected");
    }

    let mut response = ResponseObject::new().with_status(err.status());
    response.set_error(err.client_message());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{RawRequest, RequestContext};
    use gradebook_core::AppConfig;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(AppConfig::from_env()))
    }

    fn ctx(path: &str, method: &str) -> RequestContext {
        RequestContext::new(RawRequest {
            path: Some(path.to_string()),
            method: Some(method.to_string()),
            ..RawRequest::default()
        })
        .unwrap()
    }

    async fn pong(_state: Arc<AppState>, _ctx: RequestContext) -> ApiResult<ResponseObject> {
        Ok(ResponseObject::new().add_body("message", "pong"))
    }

    fn test_router() -> Router {
        Router::new().register(RouteBundle::new("/ping").get("/", pong).post("/echo", pong))
    }

    #[tokio::test]
    async fn dispatches_to_registered_handler() {
        let res = test_router().dispatch(test_state(), ctx("/ping", "GET")).await;
        assert_eq!(res.status(), 200);
        assert_eq!(res.body()["message"], "pong");
    }

    #[tokio::test]
    async fn unknown_prefix_is_not_found() {
        let res = test_router().dispatch(test_state(), ctx("/nope", "GET")).await;
        assert_eq!(res.status(), 404);
        assert_eq!(res.error(), Some("Route not found"));
    }

    #[tokio::test]
    async fn unknown_subpath_is_not_found() {
        let res = test_router().dispatch(test_state(), ctx("/ping/nope", "GET")).await;
        assert_eq!(res.status(), 404);
        assert_eq!(res.error(), Some("Route handler not found"));
    }

    #[tokio::test]
    async fn method_mismatch_is_not_found() {
        // /echo is registered for POST only.
        let res = test_router().dispatch(test_state(), ctx("/ping/echo", "GET")).await;
        assert_eq!(res.status(), 404);
    }

    #[tokio::test]
    async fn paths_deeper_than_two_segments_are_not_found() {
        let res = test_router()
            .dispatch(test_state(), ctx("/ping/echo/extra", "POST"))
            .await;
        assert_eq!(res.status(), 404);
        assert_eq!(res.error(), Some("Route path not found"));
    }

    #[tokio::test]
    async fn foreign_prefix_reaching_a_bundle_is_internal() {
        let bundle = RouteBundle::new("/ping").get("/", pong);
        let err = bundle
            .handle(test_state(), ctx("/other", "GET"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), 500);
    }

    #[tokio::test]
    async fn internal_errors_hide_detail_from_the_client() {
        // Hand-built router whose key disagrees with the bundle prefix,
        // forcing the misconfiguration path.
        let mut bundles = HashMap::new();
        bundles.insert("/other", RouteBundle::new("/ping").get("/", pong));
        let router = Router { bundles };

        let res = router.dispatch(test_state(), ctx("/other", "GET")).await;
        assert_eq!(res.status(), 500);
        assert_eq!(res.error(), Some("Internal server error"));
    }
}
