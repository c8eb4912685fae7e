//! Read-model persistence for user display identities.
//!
//! The auth service owns accounts; it pushes display names and avatars
//! here so leaderboard snapshots can denormalize them without a
//! cross-service call.

use questline_types::UserDisplay;
use sqlx::PgConnection;

use crate::error::DbError;

/// Insert or update a user's display identity.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the upsert fails.
pub async fn upsert_display(
    conn: &mut PgConnection,
    display: &UserDisplay,
) -> Result<(), DbError> {
    sqlx::query(
        r"INSERT INTO users (id, display_name, image_url)
          VALUES ($1, $2, $3)
          ON CONFLICT (id) DO UPDATE
          SET display_name = EXCLUDED.display_name, image_url = EXCLUDED.image_url",
    )
    .bind(display.user_id.into_inner())
    .bind(&display.display_name)
    .bind(&display.image_url)
    .execute(conn)
    .await?;
    Ok(())
}
