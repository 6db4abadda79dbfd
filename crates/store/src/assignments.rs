//! Assignment accessor.
//!
//! `percentage_grade` is derived from the points on every write; the client
//! never supplies it.

use sqlx::{FromRow, Row};

use gradebook_core::{percentage_grade, ApiError, AppConfig, AssignmentGroupId, AssignmentId};

use crate::db::{connect, map_sqlx_error};
use crate::model::{Assignment, AssignmentRow};

pub async fn add_assignment(
    config: &AppConfig,
    group_id: AssignmentGroupId,
    name: &str,
    points_earned: f64,
    points_possible: f64,
) -> Result<(), ApiError> {
    let percentage = percentage_grade(points_earned, points_possible);

    let mut conn = connect(config).await?;

    sqlx::query(
        r#"
        INSERT INTO assignments (assignment_group_id, name, points_earned, points_possible, percentage_grade)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(group_id.as_i64())
    .bind(name)
    .bind(points_earned)
    .bind(points_possible)
    .bind(percentage)
    .execute(&mut conn)
    .await
    .map_err(|e| map_sqlx_error("add_assignment", e))?;

    Ok(())
}

pub async fn get_assignment(
    config: &AppConfig,
    assignment_id: AssignmentId,
) -> Result<Option<Assignment>, ApiError> {
    let mut conn = connect(config).await?;

    let row = sqlx::query(
        r#"
        SELECT id, assignment_group_id, name, points_earned, points_possible, percentage_grade
        FROM assignments
        WHERE id = $1
        "#,
    )
    .bind(assignment_id.as_i64())
    .fetch_optional(&mut conn)
    .await
    .map_err(|e| map_sqlx_error("get_assignment", e))?;

    match row {
        Some(row) => {
            let assignment = AssignmentRow::from_row(&row).map_err(|e| {
                ApiError::internal(format!("failed to deserialize assignment row: {e}"))
            })?;
            Ok(Some(assignment.into()))
        }
        None => Ok(None),
    }
}

/// Group an assignment belongs to, if the assignment exists.
pub async fn assignment_group(
    config: &AppConfig,
    assignment_id: AssignmentId,
) -> Result<Option<AssignmentGroupId>, ApiError> {
    let mut conn = connect(config).await?;

    let row = sqlx::query("SELECT assignment_group_id FROM assignments WHERE id = $1")
        .bind(assignment_id.as_i64())
        .fetch_optional(&mut conn)
        .await
        .map_err(|e| map_sqlx_error("assignment_group", e))?;

    match row {
        Some(row) => {
            let group_id: i64 = row
                .try_get("assignment_group_id")
                .map_err(|e| ApiError::internal(format!("failed to read assignment_group_id: {e}")))?;
            Ok(Some(AssignmentGroupId::from_raw(group_id)))
        }
        None => Ok(None),
    }
}

/// Update the points of an assignment, recomputing the stored percentage.
pub async fn update_assignment(
    config: &AppConfig,
    assignment_id: AssignmentId,
    points_earned: f64,
    points_possible: f64,
) -> Result<(), ApiError> {
    let percentage = percentage_grade(points_earned, points_possible);

    let mut conn = connect(config).await?;

    let result = sqlx::query(
        r#"
        UPDATE assignments
        SET points_earned = $1, points_possible = $2, percentage_grade = $3
        WHERE id = $4
        "#,
    )
    .bind(points_earned)
    .bind(points_possible)
    .bind(percentage)
    .bind(assignment_id.as_i64())
    .execute(&mut conn)
    .await
    .map_err(|e| map_sqlx_error("update_assignment", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Assignment not found"));
    }

    Ok(())
}

pub async fn update_assignment_name(
    config: &AppConfig,
    assignment_id: AssignmentId,
    name: &str,
) -> Result<(), ApiError> {
    let mut conn = connect(config).await?;

    let result = sqlx::query("UPDATE assignments SET name = $1 WHERE id = $2")
        .bind(name)
        .bind(assignment_id.as_i64())
        .execute(&mut conn)
        .await
        .map_err(|e| map_sqlx_error("update_assignment_name", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Assignment not found"));
    }

    Ok(())
}

pub async fn delete_assignment(
    config: &AppConfig,
    assignment_id: AssignmentId,
) -> Result<(), ApiError> {
    let mut conn = connect(config).await?;

    let result = sqlx::query("DELETE FROM assignments WHERE id = $1")
        .bind(assignment_id.as_i64())
        .execute(&mut conn)
        .await
        .map_err(|e| map_sqlx_error("delete_assignment", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Assignment not found"));
    }

    Ok(())
}
