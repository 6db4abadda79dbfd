//! Course accessor.

use sqlx::{FromRow, Row};

use gradebook_core::{ApiError, AppConfig, CourseId, UserId};

use crate::db::{connect, is_unique_violation, map_sqlx_error};
use crate::model::{assemble_courses, Course, CourseJoinRow};

const COURSE_TREE_SELECT: &str = r#"
    SELECT c.id AS course_id, c.user_id, c.name AS course_name,
           c.credit_hours, c.gpa,
           g.id AS group_id, g.name AS group_name, g.weight AS group_weight,
           a.id AS assignment_id, a.name AS assignment_name,
           a.points_earned, a.points_possible, a.percentage_grade
    FROM courses c
    LEFT JOIN assignment_groups g ON c.id = g.course_id
    LEFT JOIN assignments a ON g.id = a.assignment_group_id
"#;

/// Insert a course for a user. Duplicate (user, name) pairs conflict.
pub async fn add_course(
    config: &AppConfig,
    user_id: UserId,
    name: &str,
    credit_hours: Option<f64>,
) -> Result<(), ApiError> {
    let credit_hours = credit_hours.unwrap_or(3.0);

    let mut conn = connect(config).await?;

    let row = sqlx::query("SELECT COUNT(*) AS count FROM courses WHERE user_id = $1 AND name = $2")
        .bind(user_id.as_i64())
        .bind(name)
        .fetch_one(&mut conn)
        .await
        .map_err(|e| map_sqlx_error("add_course_check", e))?;
    let count: i64 = row
        .try_get("count")
        .map_err(|e| ApiError::internal(format!("failed to read count: {e}")))?;
    if count > 0 {
        return Err(ApiError::conflict("Course already exists for this user"));
    }

    sqlx::query("INSERT INTO courses (user_id, name, credit_hours) VALUES ($1, $2, $3)")
        .bind(user_id.as_i64())
        .bind(name)
        .bind(credit_hours)
        .execute(&mut conn)
        .await
        .map_err(|e| {
            // The unique constraint catches the check-then-insert race.
            if is_unique_violation(&e) {
                ApiError::conflict("Course already exists for this user")
            } else {
                map_sqlx_error("add_course", e)
            }
        })?;

    Ok(())
}

/// Delete a course owned by the given user.
///
/// A single user-scoped DELETE: a course that exists but belongs to someone
/// else is indistinguishable from a missing one, so both report not-found.
pub async fn delete_course(
    config: &AppConfig,
    course_id: CourseId,
    user_id: UserId,
) -> Result<(), ApiError> {
    let mut conn = connect(config).await?;

    let result = sqlx::query("DELETE FROM courses WHERE id = $1 AND user_id = $2")
        .bind(course_id.as_i64())
        .bind(user_id.as_i64())
        .execute(&mut conn)
        .await
        .map_err(|e| map_sqlx_error("delete_course", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(
            "Course does not exist or does not belong to this user",
        ));
    }

    Ok(())
}

/// All courses for a user, with groups and assignments nested.
pub async fn get_courses_by_user(
    config: &AppConfig,
    user_id: UserId,
) -> Result<Vec<Course>, ApiError> {
    let mut conn = connect(config).await?;

    let sql = format!("{COURSE_TREE_SELECT} WHERE c.user_id = $1 ORDER BY c.id, g.id, a.id");
    let rows = sqlx::query(&sql)
        .bind(user_id.as_i64())
        .fetch_all(&mut conn)
        .await
        .map_err(|e| map_sqlx_error("get_courses_by_user", e))?;

    let mut join_rows = Vec::with_capacity(rows.len());
    for row in rows {
        let parsed = CourseJoinRow::from_row(&row)
            .map_err(|e| ApiError::internal(format!("failed to deserialize course row: {e}")))?;
        join_rows.push(parsed);
    }

    Ok(assemble_courses(join_rows))
}

/// One course by id (any owner), with groups and assignments nested.
pub async fn get_course(
    config: &AppConfig,
    course_id: CourseId,
) -> Result<Option<Course>, ApiError> {
    let mut conn = connect(config).await?;

    let sql = format!("{COURSE_TREE_SELECT} WHERE c.id = $1 ORDER BY g.id, a.id");
    let rows = sqlx::query(&sql)
        .bind(course_id.as_i64())
        .fetch_all(&mut conn)
        .await
        .map_err(|e| map_sqlx_error("get_course", e))?;

    let mut join_rows = Vec::with_capacity(rows.len());
    for row in rows {
        let parsed = CourseJoinRow::from_row(&row)
            .map_err(|e| ApiError::internal(format!("failed to deserialize course row: {e}")))?;
        join_rows.push(parsed);
    }

    Ok(assemble_courses(join_rows).into_iter().next())
}

/// Owning user of a course, if the course exists.
pub async fn course_owner(
    config: &AppConfig,
    course_id: CourseId,
) -> Result<Option<UserId>, ApiError> {
    let mut conn = connect(config).await?;

    let row = sqlx::query("SELECT user_id FROM courses WHERE id = $1")
        .bind(course_id.as_i64())
        .fetch_optional(&mut conn)
        .await
        .map_err(|e| map_sqlx_error("course_owner", e))?;

    match row {
        Some(row) => {
            let user_id: i64 = row
                .try_get("user_id")
                .map_err(|e| ApiError::internal(format!("failed to read user_id: {e}")))?;
            Ok(Some(UserId::from_raw(user_id)))
        }
        None => Ok(None),
    }
}

/// Set the gpa of a course. Ownership is checked by the caller.
pub async fn update_gpa(config: &AppConfig, course_id: CourseId, gpa: f64) -> Result<(), ApiError> {
    let mut conn = connect(config).await?;

    let result = sqlx::query("UPDATE courses SET gpa = $1 WHERE id = $2")
        .bind(gpa)
        .bind(course_id.as_i64())
        .execute(&mut conn)
        .await
        .map_err(|e| map_sqlx_error("update_gpa", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Course not found"));
    }

    Ok(())
}
