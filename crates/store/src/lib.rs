//! `gradebook-store` — data accessors for users, courses, assignment groups,
//! and assignments.
//!
//! Every operation opens a dedicated Postgres connection for its duration and
//! drops it on exit; there is no pooling and no multi-statement transaction.
//! Ownership is enforced with user-scoped predicates, never trusted from the
//! client.

pub mod assignments;
pub mod courses;
pub mod db;
pub mod groups;
pub mod model;
pub mod users;

pub use model::{Assignment, AssignmentGroup, Course, User};
