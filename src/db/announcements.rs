use sqlx::PgPool;
use tracing::info;

use crate::models::Announcement;

pub async fn active(pool: &PgPool) -> Result<Option<Announcement>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, author, content, active, created FROM announcements
         WHERE active = TRUE ORDER BY created DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await
}

/// Deactivate whatever is currently active and insert the new announcement,
/// atomically, so at most one row is ever active.
pub async fn insert(pool: &PgPool, author: &str, content: &str) -> Result<i32, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE announcements SET active = FALSE WHERE active = TRUE")
        .execute(&mut *tx)
        .await?;

    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO announcements (author, content, active) VALUES ($1, $2, TRUE) RETURNING id",
    )
    .bind(author)
    .bind(content)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!("New announcement {id} posted by {author}");

    Ok(id)
}
