//! Course handlers.

use std::sync::Arc;

use gradebook_core::{ApiError, ApiResult, CourseId};
use gradebook_store::courses;

use crate::authz;
use crate::context::{RequestContext, ResponseObject};
use crate::router::RouteBundle;
use crate::routes::parse_number;
use crate::state::AppState;

pub fn bundle() -> RouteBundle {
    RouteBundle::new("/course")
        .post("/add-course", add_course)
        .post("/delete-course", delete_course)
        .get("/get-all-courses", get_all_courses)
        .get("/get-course", get_course)
        .post("/update-course-gpa", update_course_gpa)
}

async fn add_course(state: Arc<AppState>, ctx: RequestContext) -> ApiResult<ResponseObject> {
    let claims = authz::require_claims(&ctx)?;

    let course_name = ctx.body_param("courseName")?;
    if course_name.is_empty() {
        return Err(ApiError::bad_request("Course name cannot be empty"));
    }

    let credit_hours = match ctx.body_param_opt("creditHours") {
        Some(text) => {
            let hours = parse_number(&text, "Invalid credit hours format")?;
            if hours <= 0.0 {
                return Err(ApiError::bad_request("Credit hours must be greater than 0"));
            }
            Some(hours)
        }
        None => None,
    };

    let user = authz::resolve_user(&state, &claims).await?;
    courses::add_course(&state.config, user.id, &course_name, credit_hours).await?;

    Ok(ResponseObject::new().add_body("message", "Course added successfully"))
}

async fn delete_course(state: Arc<AppState>, ctx: RequestContext) -> ApiResult<ResponseObject> {
    let claims = authz::require_claims(&ctx)?;
    let course_id: CourseId = ctx.body_param("courseId")?.parse()?;

    let user = authz::resolve_user(&state, &claims).await?;
    courses::delete_course(&state.config, course_id, user.id).await?;

    Ok(ResponseObject::new().add_body("message", "Course deleted successfully"))
}

async fn get_all_courses(state: Arc<AppState>, ctx: RequestContext) -> ApiResult<ResponseObject> {
    let claims = authz::require_claims(&ctx)?;
    let user = authz::resolve_user(&state, &claims).await?;

    let all = courses::get_courses_by_user(&state.config, user.id).await?;

    Ok(ResponseObject::new().add_body("courses", serde_json::to_value(all)?))
}

async fn get_course(state: Arc<AppState>, ctx: RequestContext) -> ApiResult<ResponseObject> {
    let claims = authz::require_claims(&ctx)?;
    let course_id: CourseId = ctx.require_query_param("courseId")?.parse()?;

    let user = authz::resolve_user(&state, &claims).await?;

    let course = courses::get_course(&state.config, course_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;
    if course.user_id != user.id {
        return Err(ApiError::forbidden("Unauthorized access to course"));
    }

    Ok(ResponseObject::new().add_body("course", serde_json::to_value(course)?))
}

async fn update_course_gpa(state: Arc<AppState>, ctx: RequestContext) -> ApiResult<ResponseObject> {
    let claims = authz::require_claims(&ctx)?;
    let course_id: CourseId = ctx.body_param("courseId")?.parse()?;

    let gpa = parse_number(&ctx.body_param("gpa")?, "Invalid GPA format")?;
    if !(0.0..=4.0).contains(&gpa) {
        return Err(ApiError::bad_request("GPA must be between 0 and 4.0"));
    }

    let user = authz::resolve_user(&state, &claims).await?;
    authz::owned_course(&state, course_id, user.id).await?;
    courses::update_gpa(&state.config, course_id, gpa).await?;

    Ok(ResponseObject::new().add_body("message", "Course GPA updated successfully"))
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

    fn mint_token() -> String {
        use jsonwebtoken::{Algorithm, EncodingKey, Header};
        let exp = chrono::Utc::now().timestamp() + 3600;
        let claims = json!({
            "oid": "subject-1",
            "email": "student@example.com",
            "preferred_username": "student",
            "exp": exp,
        });
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .expect("failed to encode jwt")
    }

    fn post_ctx(subpath: &str, body: serde_json::Value, token: Option<String>) -> RequestContext {
        let cookies = token
            .map(|t| vec![format!("accessToken={t}")])
            .unwrap_or_default();
        RequestContext::new(RawRequest {
            path: Some(format!("/course{subpath}")),
            method: Some("POST".to_string()),
            cookies,
            body: RawBody::Json(body),
            ..RawRequest::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn add_course_without_cookie_is_unauthorized() {
        let ctx = post_ctx("/add-course", json!({"courseName": "Calc"}), None);
        let err = add_course(test_state(), ctx).await.unwrap_err();
        assert_eq!(err.status(), 401);
    }

    #[tokio::test]
    async fn add_course_requires_a_name() {
        let ctx = post_ctx("/add-course", json!({}), Some(mint_token()));
        let err = add_course(test_state(), ctx).await.unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(err.client_message(), "Missing courseName parameter");
    }

    #[tokio::test]
    async fn add_course_rejects_empty_name() {
        let ctx = post_ctx("/add-course", json!({"courseName": ""}), Some(mint_token()));
        let err = add_course(test_state(), ctx).await.unwrap_err();
        assert_eq!(err.client_message(), "Course name cannot be empty");
    }

    #[tokio::test]
    async fn add_course_rejects_non_positive_credit_hours() {
        let ctx = post_ctx(
            "/add-course",
            json!({"courseName": "Calc", "creditHours": 0}),
            Some(mint_token()),
        );
        let err = add_course(test_state(), ctx).await.unwrap_err();
        assert_eq!(err.client_message(), "Credit hours must be greater than 0");
    }

    #[tokio::test]
    async fn add_course_rejects_unparseable_credit_hours() {
        let ctx = post_ctx(
            "/add-course",
            json!({"courseName": "Calc", "creditHours": "lots"}),
            Some(mint_token()),
        );
        let err = add_course(test_state(), ctx).await.unwrap_err();
        assert_eq!(err.client_message(), "Invalid credit hours format");
    }

    #[tokio::test]
    async fn delete_course_rejects_bad_ids() {
        let ctx = post_ctx("/delete-course", json!({"courseId": 0}), Some(mint_token()));
        let err = delete_course(test_state(), ctx).await.unwrap_err();
        assert_eq!(err.status(), 400);

        let ctx = post_ctx(
            "/delete-course",
            json!({"courseId": "five"}),
            Some(mint_token()),
        );
        let err = delete_course(test_state(), ctx).await.unwrap_err();
        assert_eq!(err.client_message(), "Invalid course ID format");
    }

    #[tokio::test]
    async fn update_gpa_enforces_the_range() {
        for gpa in [-0.5, 4.5] {
            let ctx = post_ctx(
                "/update-course-gpa",
                json!({"courseId": 1, "gpa": gpa}),
                Some(mint_token()),
            );
            let err = update_course_gpa(test_state(), ctx).await.unwrap_err();
            assert_eq!(err.client_message(), "GPA must be between 0 and 4.0");
        }
    }

    #[tokio::test]
    async fn get_course_requires_the_query_param() {
        let ctx = RequestContext::new(RawRequest {
            path: Some("/course/get-course".to_string()),
            method: Some("GET".to_string()),
            cookies: vec![format!("accessToken={}", mint_token())],
            ..RawRequest::default()
        })
        .unwrap();
        let err = get_course(test_state(), ctx).await.unwrap_err();
        assert_eq!(err.client_message(), "Missing courseId parameter");
    }
}
