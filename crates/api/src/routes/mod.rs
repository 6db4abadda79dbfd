//! Route handlers, one module per top-level resource.

use gradebook_core::{ApiError, ApiResult};

use crate::router::Router;

pub mod assignment;
pub mod auth;
pub mod base;
pub mod course;
pub mod user;

/// Build the full dispatch table.
pub fn router() -> Router {
    Router::new()
        .register(base::bundle())
        .register(auth::bundle())
        .register(user::bundle())
        .register(course::bundle())
        .register(assignment::bundle())
}

/// Parse a finite number out of a body/query parameter.
pub(crate) fn parse_number(text: &str, message: &'static str) -> ApiResult<f64> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request(message))?;
    if !value.is_finite() {
        return Err(ApiError::bad_request(message));
    }
    Ok(value)
}
