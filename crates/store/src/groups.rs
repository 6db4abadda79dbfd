//! Assignment-group accessor.

use sqlx::{FromRow, Row};

use gradebook_core::{ApiError, AppConfig, AssignmentGroupId, CourseId};

use crate::db::{connect, map_sqlx_error};
use crate::model::{assemble_groups, AssignmentGroup, GroupJoinRow};

const GROUP_TREE_SELECT: &str = r#"
    SELECT g.id AS group_id, g.course_id, g.name AS group_name, g.weight AS group_weight,
           a.id AS assignment_id, a.name AS assignment_name,
           a.points_earned, a.points_possible, a.percentage_grade
    FROM assignment_groups g
    LEFT JOIN assignments a ON g.id = a.assignment_group_id
"#;

pub async fn add_group(
    config: &AppConfig,
    course_id: CourseId,
    name: &str,
    weight: f64,
) -> Result<(), ApiError> {
    let mut conn = connect(config).await?;

    sqlx::query("INSERT INTO assignment_groups (course_id, name, weight) VALUES ($1, $2, $3)")
        .bind(course_id.as_i64())
        .bind(name)
        .bind(weight)
        .execute(&mut conn)
        .await
        .map_err(|e| map_sqlx_error("add_group", e))?;

    Ok(())
}

/// Groups of a course with their assignments nested.
pub async fn get_groups_by_course(
    config: &AppConfig,
    course_id: CourseId,
) -> Result<Vec<AssignmentGroup>, ApiError> {
    let mut conn = connect(config).await?;

    let sql = format!("{GROUP_TREE_SELECT} WHERE g.course_id = $1 ORDER BY g.id, a.id");
    let rows = sqlx::query(&sql)
        .bind(course_id.as_i64())
        .fetch_all(&mut conn)
        .await
        .map_err(|e| map_sqlx_error("get_groups_by_course", e))?;

    let mut join_rows = Vec::with_capacity(rows.len());
    for row in rows {
        let parsed = GroupJoinRow::from_row(&row)
            .map_err(|e| ApiError::internal(format!("failed to deserialize group row: {e}")))?;
        join_rows.push(parsed);
    }

    Ok(assemble_groups(join_rows))
}

pub async fn get_group(
    config: &AppConfig,
    group_id: AssignmentGroupId,
) -> Result<Option<AssignmentGroup>, ApiError> {
    let mut conn = connect(config).await?;

    let sql = format!("{GROUP_TREE_SELECT} WHERE g.id = $1 ORDER BY a.id");
    let rows = sqlx::query(&sql)
        .bind(group_id.as_i64())
        .fetch_all(&mut conn)
        .await
        .map_err(|e| map_sqlx_error("get_group", e))?;

    let mut join_rows = Vec::with_capacity(rows.len());
    for row in rows {
        let parsed = GroupJoinRow::from_row(&row)
            .map_err(|e| ApiError::internal(format!("failed to deserialize group row: {e}")))?;
        join_rows.push(parsed);
    }

    Ok(assemble_groups(join_rows).into_iter().next())
}

/// Course a group belongs to, if the group exists.
pub async fn group_course(
    config: &AppConfig,
    group_id: AssignmentGroupId,
) -> Result<Option<CourseId>, ApiError> {
    let mut conn = connect(config).await?;

    let row = sqlx::query("SELECT course_id FROM assignment_groups WHERE id = $1")
        .bind(group_id.as_i64())
        .fetch_optional(&mut conn)
        .await
        .map_err(|e| map_sqlx_error("group_course", e))?;

    match row {
        Some(row) => {
            let course_id: i64 = row
                .try_get("course_id")
                .map_err(|e| ApiError::internal(format!("failed to read course_id: {e}")))?;
            Ok(Some(CourseId::from_raw(course_id)))
        }
        None => Ok(None),
    }
}

pub async fn update_group_name(
    config: &AppConfig,
    group_id: AssignmentGroupId,
    name: &str,
) -> Result<(), ApiError> {
    let mut conn = connect(config).await?;

    let result = sqlx::query("UPDATE assignment_groups SET name = $1 WHERE id = $2")
        .bind(name)
        .bind(group_id.as_i64())
        .execute(&mut conn)
        .await
        .map_err(|e| map_sqlx_error("update_group_name", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Assignment group not found"));
    }

    Ok(())
}

/// Delete a group and its assignments.
///
/// Two independent statements on one connection; if the second fails the
/// assignment delete has already committed. That partial failure surfaces as
/// a generic internal error.
pub async fn delete_group(config: &AppConfig, group_id: AssignmentGroupId) -> Result<(), ApiError> {
    let mut conn = connect(config).await?;

    sqlx::query("DELETE FROM assignments WHERE assignment_group_id = $1")
        .bind(group_id.as_i64())
        .execute(&mut conn)
        .await
        .map_err(|e| map_sqlx_error("delete_group_assignments", e))?;

    let result = sqlx::query("DELETE FROM assignment_groups WHERE id = $1")
        .bind(group_id.as_i64())
        .execute(&mut conn)
        .await
        .map_err(|e| map_sqlx_error("delete_group", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Assignment group not found"));
    }

    Ok(())
}
