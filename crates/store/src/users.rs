//! User accessor: lazy creation keyed on the identity-provider oid.

use sqlx::FromRow;

use gradebook_core::{ApiError, AppConfig};

use crate::db::{connect, map_sqlx_error};
use crate::model::{User, UserRow};

/// Fetch the user for an oid, creating the row on first sighting.
///
/// A single upsert keeps this race-safe under the unique constraint on
/// `oid`: concurrent first requests all land on the same row, and
/// username/email are re-mirrored from the claims whenever they drift.
pub async fn get_or_create_by_oid(
    config: &AppConfig,
    oid: &str,
    username: &str,
    email: &str,
) -> Result<User, ApiError> {
    if oid.is_empty() {
        return Err(ApiError::bad_request("User ID cannot be null or empty"));
    }

    let mut conn = connect(config).await?;

    let row = sqlx::query(
        r#"
        INSERT INTO users (oid, username, email)
        VALUES ($1, $2, $3)
        ON CONFLICT (oid)
        DO UPDATE SET username = EXCLUDED.username, email = EXCLUDED.email
        RETURNING id, oid, username, email
        "#,
    )
    .bind(oid)
    .bind(username)
    .bind(email)
    .fetch_one(&mut conn)
    .await
    .map_err(|e| map_sqlx_error("get_or_create_by_oid", e))?;

    let user = UserRow::from_row(&row)
        .map_err(|e| ApiError::internal(format!("failed to deserialize user row: {e}")))?;

    Ok(user.into())
}
