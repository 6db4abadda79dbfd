//! `gradebook-core` — shared foundation for the gradebook backend.
//!
//! This crate contains the pieces every other crate leans on: typed
//! identifiers, the API error taxonomy, process configuration, and the
//! grade-percentage calculation. No HTTP or database concerns live here.

pub mod config;
pub mod error;
pub mod grade;
pub mod id;

pub use config::AppConfig;
pub use error::{ApiError, ApiResult};
pub use grade::percentage_grade;
pub use id::{AssignmentGroupId, AssignmentId, CourseId, UserId};
