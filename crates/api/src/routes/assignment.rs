//! Assignment and assignment-group handlers.

use std::sync::Arc;

use gradebook_core::{ApiError, ApiResult, AssignmentGroupId, AssignmentId, CourseId};
use gradebook_store::{assignments, groups};

use crate::authz;
use crate::context::{RequestContext, ResponseObject};
use crate::router::RouteBundle;
use crate::routes::parse_number;
use crate::state::AppState;

pub fn bundle() -> RouteBundle {
    RouteBundle::new("/assignment")
        .post("/add-assignment-group", add_assignment_group)
        .post("/add-assignment", add_assignment)
        .get("/get-assignment", get_assignment)
        .get("/get-assignment-groups", get_assignment_groups)
        .get("/get-assignment-group", get_assignment_group)
        .post("/update-assignment", update_assignment)
        .post("/update-assignment-name", update_assignment_name)
        .post("/update-assignment-group", update_assignment_group)
        .post("/delete-assignment", delete_assignment)
        .post("/delete-assignment-group", delete_assignment_group)
}

fn validate_weight(text: &str) -> ApiResult<f64> {
    let weight = parse_number(text, "Invalid weight format")?;
    if weight <= 0.0 || weight > 1.0 {
        return Err(ApiError::bad_request("Weight must be between 0 and 1"));
    }
    Ok(weight)
}

fn validate_points(earned_text: &str, possible_text: &str) -> ApiResult<(f64, f64)> {
    let earned = parse_number(earned_text, "Invalid pointsEarned format")?;
    if earned < 0.0 {
        return Err(ApiError::bad_request("Points earned cannot be negative"));
    }

    let possible = parse_number(possible_text, "Invalid pointsPossible format")?;
    if possible <= 0.0 {
        return Err(ApiError::bad_request("Points possible must be greater than 0"));
    }

    if earned > possible {
        return Err(ApiError::bad_request(
            "Points earned cannot be greater than points possible",
        ));
    }

    Ok((earned, possible))
}

async fn add_assignment_group(
    state: Arc<AppState>,
    ctx: RequestContext,
) -> ApiResult<ResponseObject> {
    let claims = authz::require_claims(&ctx)?;
    let course_id: CourseId = ctx.body_param("courseId")?.parse()?;

    let group_name = ctx.body_param("groupName")?;
    if group_name.is_empty() {
        return Err(ApiError::bad_request("Group name cannot be empty"));
    }

    let weight = validate_weight(&ctx.body_param("weight")?)?;

    let user = authz::resolve_user(&state, &claims).await?;
    authz::owned_course(&state, course_id, user.id).await?;
    groups::add_group(&state.config, course_id, &group_name, weight).await?;

    Ok(ResponseObject::new().add_body("message", "Assignment group added successfully"))
}

async fn add_assignment(state: Arc<AppState>, ctx: RequestContext) -> ApiResult<ResponseObject> {
    let claims = authz::require_claims(&ctx)?;
    let group_id: AssignmentGroupId = ctx.body_param("assignmentGroupId")?.parse()?;

    let assignment_name = ctx.body_param("assignmentName")?;
    if assignment_name.is_empty() {
        return Err(ApiError::bad_request("Assignment name cannot be empty"));
    }

    let (earned, possible) = validate_points(
        &ctx.body_param("pointsEarned")?,
        &ctx.body_param("pointsPossible")?,
    )?;

    let user = authz::resolve_user(&state, &claims).await?;
    authz::owned_group(&state, group_id, user.id).await?;
    assignments::add_assignment(&state.config, group_id, &assignment_name, earned, possible)
        .await?;

    Ok(ResponseObject::new().add_body("message", "Assignment added successfully"))
}

async fn get_assignment(state: Arc<AppState>, ctx: RequestContext) -> ApiResult<ResponseObject> {
    let claims = authz::require_claims(&ctx)?;
    let assignment_id: AssignmentId = ctx.require_query_param("assignmentId")?.parse()?;

    let user = authz::resolve_user(&state, &claims).await?;
    authz::owned_assignment(&state, assignment_id, user.id).await?;

    let assignment = assignments::get_assignment(&state.config, assignment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Assignment not found"))?;

    Ok(ResponseObject::new().add_body("assignment", serde_json::to_value(assignment)?))
}

async fn get_assignment_groups(
    state: Arc<AppState>,
    ctx: RequestContext,
) -> ApiResult<ResponseObject> {
    let claims = authz::require_claims(&ctx)?;
    let course_id: CourseId = ctx.require_query_param("courseId")?.parse()?;

    let user = authz::resolve_user(&state, &claims).await?;
    authz::owned_course(&state, course_id, user.id).await?;

    let all = groups::get_groups_by_course(&state.config, course_id).await?;

    Ok(ResponseObject::new().add_body("assignmentGroups", serde_json::to_value(all)?))
}

async fn get_assignment_group(
    state: Arc<AppState>,
    ctx: RequestContext,
) -> ApiResult<ResponseObject> {
    let claims = authz::require_claims(&ctx)?;
    let group_id: AssignmentGroupId = ctx.require_query_param("groupId")?.parse()?;

    let user = authz::resolve_user(&state, &claims).await?;
    authz::owned_group(&state, group_id, user.id).await?;

    let group = groups::get_group(&state.config, group_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Assignment group not found"))?;

    Ok(ResponseObject::new().add_body("assignmentGroup", serde_json::to_value(group)?))
}

async fn update_assignment(state: Arc<AppState>, ctx: RequestContext) -> ApiResult<ResponseObject> {
    let claims = authz::require_claims(&ctx)?;
    let assignment_id: AssignmentId = ctx.body_param("assignmentId")?.parse()?;

    let (earned, possible) = validate_points(
        &ctx.body_param("pointsEarned")?,
        &ctx.body_param("pointsPossible")?,
    )?;

    let user = authz::resolve_user(&state, &claims).await?;
    authz::owned_assignment(&state, assignment_id, user.id).await?;
    assignments::update_assignment(&state.config, assignment_id, earned, possible).await?;

    Ok(ResponseObject::new().add_body("message", "Assignment updated successfully"))
}

async fn update_assignment_name(
    state: Arc<AppState>,
    ctx: RequestContext,
) -> ApiResult<ResponseObject> {
    let claims = authz::require_claims(&ctx)?;
    let assignment_id: AssignmentId = ctx.body_param("assignmentId")?.parse()?;

    let name = ctx.body_param("name")?;
    if name.is_empty() {
        return Err(ApiError::bad_request("Assignment name cannot be empty"));
    }

    let user = authz::resolve_user(&state, &claims).await?;
    authz::owned_assignment(&state, assignment_id, user.id).await?;
    assignments::update_assignment_name(&state.config, assignment_id, &name).await?;

    Ok(ResponseObject::new().add_body("message", "Assignment name updated successfully"))
}

async fn update_assignment_group(
    state: Arc<AppState>,
    ctx: RequestContext,
) -> ApiResult<ResponseObject> {
    let claims = authz::require_claims(&ctx)?;
    let group_id: AssignmentGroupId = ctx.body_param("groupId")?.parse()?;

    let name = ctx.body_param("name")?;
    if name.is_empty() {
        return Err(ApiError::bad_request("Group name cannot be empty"));
    }

    let user = authz::resolve_user(&state, &claims).await?;
    authz::owned_group(&state, group_id, user.id).await?;
    groups::update_group_name(&state.config, group_id, &name).await?;

    Ok(ResponseObject::new().add_body("message", "Assignment group name updated successfully"))
}

async fn delete_assignment(state: Arc<AppState>, ctx: RequestContext) -> ApiResult<ResponseObject> {
    let claims = authz::require_claims(&ctx)?;
    let assignment_id: AssignmentId = ctx.body_param("assignmentId")?.parse()?;

    let user = authz::resolve_user(&state, &claims).await?;
    authz::owned_assignment(&state, assignment_id, user.id).await?;
    assignments::delete_assignment(&state.config, assignment_id).await?;

    Ok(ResponseObject::new().add_body("message", "Assignment deleted successfully"))
}

async fn delete_assignment_group(
    state: Arc<AppState>,
    ctx: RequestContext,
) -> ApiResult<ResponseObject> {
    let claims = authz::require_claims(&ctx)?;
    let group_id: AssignmentGroupId = ctx.body_param("groupId")?.parse()?;

    let user = authz::resolve_user(&state, &claims).await?;
    authz::owned_group(&state, group_id, user.id).await?;
    groups::delete_group(&state.config, group_id).await?;

    Ok(ResponseObject::new().add_body("message", "Assignment group deleted successfully"))
}
