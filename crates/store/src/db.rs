//! Connection handling and sqlx error mapping.
//!
//! ## Error Mapping
//!
//! | SQLx error | Postgres code | ApiError | Scenario |
//! |------------|---------------|----------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | Duplicate row (e.g. course name reused, concurrent user upsert) |
//! | Database (other) | any other | `Internal` | Constraint/check failures the accessors should have prevented |
//! | RowNotFound | n/a | `NotFound` | Single-row fetch found nothing |
//! | Other | n/a | `Internal` | Network/connection failures |

use sqlx::{Connection, PgConnection};

use gradebook_core::{ApiError, AppConfig};

/// Open a dedicated connection for one accessor operation.
///
/// Dropped (and thereby closed) unconditionally when the operation returns,
/// success or failure.
pub async fn connect(config: &AppConfig) -> Result<PgConnection, ApiError> {
    PgConnection::connect(&config.database_url)
        .await
        .map_err(|e| ApiError::internal(format!("failed to connect to database: {e}")))
}

/// Map sqlx errors onto the API error taxonomy.
pub fn map_sqlx_error(operation: &str, err: sqlx::Error) -> ApiError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            if db_err.code().as_deref() == Some("23505") {
                ApiError::conflict(msg)
            } else {
                ApiError::internal(msg)
            }
        }
        sqlx::Error::RowNotFound => ApiError::not_found(format!("no row found in {operation}")),
        other => ApiError::internal(format!("sqlx error in {operation}: {other}")),
    }
}

/// Whether an error is a unique-constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().as_deref() == Some("23505");
    }
    false
}
