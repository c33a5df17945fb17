use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Session;

pub async fn create(
    pool: &PgPool,
    username: &str,
    ttl_hours: i64,
) -> Result<Session, sqlx::Error> {
    let id = Uuid::new_v4();
    let expires_at = Utc::now() + Duration::hours(ttl_hours);

    sqlx::query_as(
        "INSERT INTO sessions (id, username, expires_at) VALUES ($1, $2, $3)
         RETURNING id, username, expires_at, created",
    )
    .bind(id)
    .bind(username)
    .bind(expires_at)
    .fetch_one(pool)
    .await
}

/// Look up a live session; expired rows are treated as absent.
pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<Session>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, username, expires_at, created FROM sessions
         WHERE id = $1 AND expires_at > now()",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
