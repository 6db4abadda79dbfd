//! Wire/domain models and the row types they are assembled from.

use serde::{Deserialize, Serialize};
use sqlx::Row;

use gradebook_core::{AssignmentGroupId, AssignmentId, CourseId, UserId};

/// Local user record, keyed externally by the identity-provider oid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub oid: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub user_id: UserId,
    pub name: String,
    pub credit_hours: f64,
    pub gpa: Option<f64>,
    pub assignment_groups: Vec<AssignmentGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentGroup {
    pub id: AssignmentGroupId,
    pub course_id: CourseId,
    pub name: String,
    /// Fraction of the total course grade, in (0, 1].
    pub weight: f64,
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: AssignmentId,
    pub assignment_group_id: AssignmentGroupId,
    pub name: String,
    pub points_earned: f64,
    pub points_possible: f64,
    /// Always derived server-side, never client-supplied.
    pub percentage_grade: f64,
}

// Row types

#[derive(Debug)]
pub(crate) struct UserRow {
    pub id: i64,
    pub oid: String,
    pub username: String,
    pub email: String,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for UserRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            id: row.try_get("id")?,
            oid: row.try_get("oid")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
        })
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::from_raw(row.id),
            oid: row.oid,
            username: row.username,
            email: row.email,
        }
    }
}

/// One row of the course → group → assignment LEFT JOIN.
///
/// Group and assignment columns are nullable: a course with no groups (or a
/// group with no assignments) still produces a row.
#[derive(Debug)]
pub(crate) struct CourseJoinRow {
    pub course_id: i64,
    pub user_id: i64,
    pub course_name: String,
    pub credit_hours: f64,
    pub gpa: Option<f64>,
    pub group_id: Option<i64>,
    pub group_name: Option<String>,
    pub group_weight: Option<f64>,
    pub assignment_id: Option<i64>,
    pub assignment_name: Option<String>,
    pub points_earned: Option<f64>,
    pub points_possible: Option<f64>,
    pub percentage_grade: Option<f64>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for CourseJoinRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(CourseJoinRow {
            course_id: row.try_get("course_id")?,
            user_id: row.try_get("user_id")?,
            course_name: row.try_get("course_name")?,
            credit_hours: row.try_get("credit_hours")?,
            gpa: row.try_get("gpa")?,
            group_id: row.try_get("group_id")?,
            group_name: row.try_get("group_name")?,
            group_weight: row.try_get("group_weight")?,
            assignment_id: row.try_get("assignment_id")?,
            assignment_name: row.try_get("assignment_name")?,
            points_earned: row.try_get("points_earned")?,
            points_possible: row.try_get("points_possible")?,
            percentage_grade: row.try_get("percentage_grade")?,
        })
    }
}

/// One row of the group → assignment LEFT JOIN.
#[derive(Debug)]
pub(crate) struct GroupJoinRow {
    pub group_id: i64,
    pub course_id: i64,
    pub group_name: String,
    pub group_weight: f64,
    pub assignment_id: Option<i64>,
    pub assignment_name: Option<String>,
    pub points_earned: Option<f64>,
    pub points_possible: Option<f64>,
    pub percentage_grade: Option<f64>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for GroupJoinRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(GroupJoinRow {
            group_id: row.try_get("group_id")?,
            course_id: row.try_get("course_id")?,
            group_name: row.try_get("group_name")?,
            group_weight: row.try_get("group_weight")?,
            assignment_id: row.try_get("assignment_id")?,
            assignment_name: row.try_get("assignment_name")?,
            points_earned: row.try_get("points_earned")?,
            points_possible: row.try_get("points_possible")?,
            percentage_grade: row.try_get("percentage_grade")?,
        })
    }
}

#[derive(Debug)]
pub(crate) struct AssignmentRow {
    pub id: i64,
    pub assignment_group_id: i64,
    pub name: String,
    pub points_earned: f64,
    pub points_possible: f64,
    pub percentage_grade: f64,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for AssignmentRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(AssignmentRow {
            id: row.try_get("id")?,
            assignment_group_id: row.try_get("assignment_group_id")?,
            name: row.try_get("name")?,
            points_earned: row.try_get("points_earned")?,
            points_possible: row.try_get("points_possible")?,
            percentage_grade: row.try_get("percentage_grade")?,
        })
    }
}

impl From<AssignmentRow> for Assignment {
    fn from(row: AssignmentRow) -> Self {
        Assignment {
            id: AssignmentId::from_raw(row.id),
            assignment_group_id: AssignmentGroupId::from_raw(row.assignment_group_id),
            name: row.name,
            points_earned: row.points_earned,
            points_possible: row.points_possible,
            percentage_grade: row.percentage_grade,
        }
    }
}

// Join-row assembly

/// Fold course join rows into nested courses, preserving row order.
pub(crate) fn assemble_courses(rows: Vec<CourseJoinRow>) -> Vec<Course> {
    let mut courses: Vec<Course> = Vec::new();

    for row in rows {
        let course_id = CourseId::from_raw(row.course_id);
        let course_idx = match courses.iter().position(|c| c.id == course_id) {
            Some(idx) => idx,
            None => {
                courses.push(Course {
                    id: course_id,
                    user_id: UserId::from_raw(row.user_id),
                    name: row.course_name.clone(),
                    credit_hours: row.credit_hours,
                    gpa: row.gpa,
                    assignment_groups: Vec::new(),
                });
                courses.len() - 1
            }
        };
        let course = &mut courses[course_idx];

        let Some(group_id) = row.group_id else {
            continue;
        };
        let group_id = AssignmentGroupId::from_raw(group_id);
        let group_idx = match course.assignment_groups.iter().position(|g| g.id == group_id) {
            Some(idx) => idx,
            None => {
                course.assignment_groups.push(AssignmentGroup {
                    id: group_id,
                    course_id,
                    name: row.group_name.clone().unwrap_or_default(),
                    weight: row.group_weight.unwrap_or_default(),
                    assignments: Vec::new(),
                });
                course.assignment_groups.len() - 1
            }
        };
        let group = &mut course.assignment_groups[group_idx];

        if let Some(assignment_id) = row.assignment_id {
            group.assignments.push(Assignment {
                id: AssignmentId::from_raw(assignment_id),
                assignment_group_id: group_id,
                name: row.assignment_name.unwrap_or_default(),
                points_earned: row.points_earned.unwrap_or_default(),
                points_possible: row.points_possible.unwrap_or_default(),
                percentage_grade: row.percentage_grade.unwrap_or_default(),
            });
        }
    }

    courses
}

/// Fold group join rows into groups with nested assignments.
pub(crate) fn assemble_groups(rows: Vec<GroupJoinRow>) -> Vec<AssignmentGroup> {
    let mut groups: Vec<AssignmentGroup> = Vec::new();

    for row in rows {
        let group_id = AssignmentGroupId::from_raw(row.group_id);
        let group_idx = match groups.iter().position(|g| g.id == group_id) {
            Some(idx) => idx,
            None => {
                groups.push(AssignmentGroup {
                    id: group_id,
                    course_id: CourseId::from_raw(row.course_id),
                    name: row.group_name.clone(),
                    weight: row.group_weight,
                    assignments: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[group_idx];

        if let Some(assignment_id) = row.assignment_id {
            group.assignments.push(Assignment {
                id: AssignmentId::from_raw(assignment_id),
                assignment_group_id: group_id,
                name: row.assignment_name.unwrap_or_default(),
                points_earned: row.points_earned.unwrap_or_default(),
                points_possible: row.points_possible.unwrap_or_default(),
                percentage_grade: row.percentage_grade.unwrap_or_default(),
            });
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join_row(course_id: i64, group_id: Option<i64>, assignment_id: Option<i64>) -> CourseJoinRow {
        CourseJoinRow {
            course_id,
            user_id: 1,
            course_name: format!("course-{course_id}"),
            credit_hours: 3.0,
            gpa: None,
            group_id,
            group_name: group_id.map(|g| format!("group-{g}")),
            group_weight: group_id.map(|_| 0.5),
            assignment_id,
            assignment_name: assignment_id.map(|a| format!("assignment-{a}")),
            points_earned: assignment_id.map(|_| 45.0),
            points_possible: assignment_id.map(|_| 50.0),
            percentage_grade: assignment_id.map(|_| 90.0),
        }
    }

    #[test]
    fn course_with_no_groups_assembles_empty() {
        let courses = assemble_courses(vec![join_row(1, None, None)]);
        assert_eq!(courses.len(), 1);
        assert!(courses[0].assignment_groups.is_empty());
    }

    #[test]
    fn group_rows_nest_under_their_course() {
        let courses = assemble_courses(vec![
            join_row(1, Some(10), Some(100)),
            join_row(1, Some(10), Some(101)),
            join_row(1, Some(11), None),
            join_row(2, None, None),
        ]);
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].assignment_groups.len(), 2);
        assert_eq!(courses[0].assignment_groups[0].assignments.len(), 2);
        assert!(courses[0].assignment_groups[1].assignments.is_empty());
        assert!(courses[1].assignment_groups.is_empty());
    }

    #[test]
    fn course_order_follows_first_appearance() {
        let courses = assemble_courses(vec![
            join_row(7, None, None),
            join_row(3, None, None),
            join_row(7, Some(1), None),
        ]);
        let ids: Vec<i64> = courses.iter().map(|c| c.id.as_i64()).collect();
        assert_eq!(ids, vec![7, 3]);
    }

    #[test]
    fn group_assembly_nests_assignments() {
        let rows = vec![
            GroupJoinRow {
                group_id: 10,
                course_id: 1,
                group_name: "Homework".to_string(),
                group_weight: 0.5,
                assignment_id: Some(100),
                assignment_name: Some("HW1".to_string()),
                points_earned: Some(45.0),
                points_possible: Some(50.0),
                percentage_grade: Some(90.0),
            },
            GroupJoinRow {
                group_id: 10,
                course_id: 1,
                group_name: "Homework".to_string(),
                group_weight: 0.5,
                assignment_id: None,
                assignment_name: None,
                points_earned: None,
                points_possible: None,
                percentage_grade: None,
            },
        ];
        let groups = assemble_groups(rows);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].assignments.len(), 1);
        assert_eq!(groups[0].assignments[0].percentage_grade, 90.0);
    }

    #[test]
    fn models_serialize_camel_case() {
        let a = Assignment {
            id: AssignmentId::from_raw(1),
            assignment_group_id: AssignmentGroupId::from_raw(2),
            name: "HW1".to_string(),
            points_earned: 45.0,
            points_possible: 50.0,
            percentage_grade: 90.0,
        };
        let v = serde_json::to_value(&a).unwrap();
        assert_eq!(v["assignmentGroupId"], 2);
        assert_eq!(v["pointsEarned"], 45.0);
        assert_eq!(v["percentageGrade"], 90.0);
    }
}
