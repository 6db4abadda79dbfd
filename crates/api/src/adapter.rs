//! Transport glue: axum request in, normalized dispatch, axum response out.
//!
//! The whole surface hangs off a single fallback service; routing decisions
//! belong to [`crate::router`], not to axum.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{Query, State};
use axum::http::{header, HeaderName, HeaderValue, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use gradebook_core::{ApiError, ApiResult};

use crate::context::{RawBody, RawRequest, RequestContext, ResponseObject};
use crate::router::{self, Router};
use crate::routes;
use crate::state::AppState;

const BODY_LIMIT: usize = 1 << 20;

#[derive(Clone)]
struct Shared {
    state: Arc<AppState>,
    router: Arc<Router>,
}

/// Build the axum application (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(state: Arc<AppState>) -> axum::Router {
    let shared = Shared {
        state,
        router: Arc::new(routes::router()),
    };
    axum::Router::new()
        .fallback(dispatch)
        .with_state(shared)
        .layer(tower::ServiceBuilder::new())
}

async fn dispatch(State(shared): State<Shared>, req: Request<Body>) -> Response {
    let raw = match normalize(req).await {
        Ok(raw) => raw,
        Err(err) => return render(router::error_response(&err)),
    };

    let ctx = match RequestContext::new(raw) {
        Ok(ctx) => ctx,
        Err(err) => return render(router::error_response(&err)),
    };

    render(shared.router.dispatch(shared.state.clone(), ctx).await)
}

/// Lower a transport request into the normalized input format.
async fn normalize(req: Request<Body>) -> ApiResult<RawRequest> {
    let (parts, body) = req.into_parts();

    let query: HashMap<String, String> = Query::try_from_uri(&parts.uri)
        .map(|Query(q)| q)
        .unwrap_or_default();

    let mut headers = HashMap::new();
    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            headers.insert(name.as_str().to_string(), value.to_string());
        }
    }

    let mut cookies = Vec::new();
    for value in parts.headers.get_all(header::COOKIE) {
        if let Ok(value) = value.to_str() {
            cookies.extend(
                value
                    .split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from),
            );
        }
    }

    let bytes = to_bytes(body, BODY_LIMIT)
        .await
        .map_err(|e| ApiError::internal(format!("failed to read request body: {e}")))?;
    let body = if bytes.is_empty() {
        RawBody::Absent
    } else {
        RawBody::Text(String::from_utf8_lossy(&bytes).into_owned())
    };

    Ok(RawRequest {
        path: Some(parts.uri.path().to_string()),
        method: Some(parts.method.as_str().to_string()),
        headers,
        cookies,
        query,
        body,
    })
}

/// Lift a normalized response back into a transport response.
fn render(res: ResponseObject) -> Response {
    let status =
        StatusCode::from_u16(res.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut response =
        (status, Json(serde_json::Value::Object(res.body().clone()))).into_response();

    let headers = response.headers_mut();
    for (name, value) in res.headers() {
        // Json already set the content type.
        if name.eq_ignore_ascii_case("content-type") {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            headers.insert(name, value);
        }
    }

    for cookie in res.cookie_strings() {
        if let Ok(value) = HeaderValue::try_from(cookie) {
            headers.append(header::SET_COOKIE, value);
        }
    }

    response
}
