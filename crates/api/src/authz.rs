//! Token and ownership guards shared by handlers.
//!
//! Every course/group/assignment operation runs the same four steps:
//! load, check owner, act, map errors. The load/check/map part lives here so
//! handlers only state which resource they touch.

use chrono::Utc;

use gradebook_auth::{validate_and_get_claims, TokenClaims};
use gradebook_core::{ApiError, ApiResult, AssignmentGroupId, AssignmentId, CourseId, UserId};
use gradebook_store::{assignments, courses, groups, users, User};

use crate::context::RequestContext;
use crate::state::AppState;

/// Name of the bearer-credential cookie.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Claims from the access-token cookie; 401 when absent or invalid.
pub fn require_claims(ctx: &RequestContext) -> ApiResult<TokenClaims> {
    let token = ctx
        .cookie(ACCESS_TOKEN_COOKIE)
        .ok_or_else(|| ApiError::unauthorized("No access token given, not logged in"))?;
    Ok(validate_and_get_claims(token, Utc::now())?)
}

/// Subject id out of validated claims; 400 when the claim is absent
/// (validation normally guarantees it).
pub fn claims_oid(claims: &TokenClaims) -> ApiResult<&str> {
    claims
        .oid
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("Token is missing a subject id"))
}

/// Resolve the local user for validated claims, creating the row on first
/// sighting of the oid.
pub async fn resolve_user(state: &AppState, claims: &TokenClaims) -> ApiResult<User> {
    let oid = claims_oid(claims)?;
    let username = claims.username().unwrap_or(oid).to_string();
    let email = claims.email.clone().unwrap_or_default();
    users::get_or_create_by_oid(&state.config, oid, &username, &email).await
}

/// Check that a course exists and belongs to the user.
pub async fn owned_course(
    state: &AppState,
    course_id: CourseId,
    user_id: UserId,
) -> ApiResult<()> {
    match courses::course_owner(&state.config, course_id).await? {
        None => Err(ApiError::not_found("Course not found")),
        Some(owner) if owner != user_id => {
            Err(ApiError::forbidden("Unauthorized access to course"))
        }
        Some(_) => Ok(()),
    }
}

/// Check a group's ownership chain (group → course → user). Returns the
/// course the group belongs to.
pub async fn owned_group(
    state: &AppState,
    group_id: AssignmentGroupId,
    user_id: UserId,
) -> ApiResult<CourseId> {
    let course_id = groups::group_course(&state.config, group_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Assignment group not found"))?;

    match courses::course_owner(&state.config, course_id).await? {
        None => Err(ApiError::not_found("Course not found")),
        Some(owner) if owner != user_id => {
            Err(ApiError::forbidden("Unauthorized access to assignment group"))
        }
        Some(_) => Ok(course_id),
    }
}

/// Check an assignment's ownership chain (assignment → group → course →
/// user). Returns the group the assignment belongs to.
pub async fn owned_assignment(
    state: &AppState,
    assignment_id: AssignmentId,
    user_id: UserId,
) -> ApiResult<AssignmentGroupId> {
    let group_id = assignments::assignment_group(&state.config, assignment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Assignment not found"))?;

    let course_id = groups::group_course(&state.config, group_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Assignment group not found"))?;

    match courses::course_owner(&state.config, course_id).await? {
        None => Err(ApiError::not_found("Course not found")),
        Some(owner) if owner != user_id => {
            Err(ApiError::forbidden("Unauthorized access to assignment"))
        }
        Some(_) => Ok(group_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RawRequest;

    fn ctx_with_cookies(cookies: Vec<String>) -> RequestContext {
        RequestContext::new(RawRequest {
            path: Some("/course/get-all-courses".to_string()),
            method: Some("GET".to_string()),
            cookies,
            ..RawRequest::default()
        })
        .unwrap()
    }

    #[test]
    fn missing_cookie_is_unauthorized() {
        let err = require_claims(&ctx_with_cookies(vec![])).unwrap_err();
        assert_eq!(err.status(), 401);
        assert_eq!(err.client_message(), "No access token given, not logged in");
    }

    #[test]
    fn malformed_token_is_unauthorized() {
        let ctx = ctx_with_cookies(vec!["accessToken=garbage".to_string()]);
        let err = require_claims(&ctx).unwrap_err();
        assert_eq!(err.status(), 401);
    }

    #[test]
    fn empty_token_is_unauthorized() {
        let ctx = ctx_with_cookies(vec!["accessToken=".to_string()]);
        let err = require_claims(&ctx).unwrap_err();
        assert_eq!(err.status(), 401);
    }
}
