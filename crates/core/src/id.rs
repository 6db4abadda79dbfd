//! Strongly-typed identifiers for the resource hierarchy.
//!
//! All keys are positive database integers; parsing rejects zero and
//! negative values so handlers never have to re-check.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Identifier of a user row (internal key; the external subject id is the oid).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

/// Identifier of a course.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(i64);

/// Identifier of an assignment group within a course.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentGroupId(i64);

/// Identifier of an assignment within a group.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentId(i64);

macro_rules! impl_int_id {
    ($t:ty, $label:literal) => {
        impl $t {
            /// Wrap a raw key. Rejects non-positive values.
            pub fn new(raw: i64) -> Result<Self, ApiError> {
                if raw <= 0 {
                    return Err(ApiError::bad_request(concat!("Invalid ", $label)));
                }
                Ok(Self(raw))
            }

            /// Wrap a value read back from the database, which is trusted.
            pub fn from_raw(raw: i64) -> Self {
                Self(raw)
            }

            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = ApiError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw: i64 = s
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::bad_request(concat!("Invalid ", $label, " format")))?;
                Self::new(raw)
            }
        }
    };
}

impl_int_id!(UserId, "user ID");
impl_int_id!(CourseId, "course ID");
impl_int_id!(AssignmentGroupId, "group ID");
impl_int_id!(AssignmentId, "assignment ID");
