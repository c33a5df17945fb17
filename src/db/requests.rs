use sqlx::PgPool;
use tracing::info;

use crate::models::{BookRequest, STATUS_FOUND, STATUS_MISSING};

pub async fn get(pool: &PgPool, id: i32) -> Result<Option<BookRequest>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, requester, title, status, book_id, created FROM requests WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn latest(pool: &PgPool, limit: i64) -> Result<Vec<BookRequest>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, requester, title, status, book_id, created FROM requests
         ORDER BY created DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn insert(
    pool: &PgPool,
    requester: &str,
    title: &str,
    source: &str,
) -> Result<i32, sqlx::Error> {
    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO requests (requester, title, source, status, book_id) VALUES ($1, $2, $3, $4, '') RETURNING id",
    )
    .bind(requester)
    .bind(title)
    .bind(source)
    .bind(STATUS_MISSING)
    .fetch_one(pool)
    .await?;

    info!("New request submitted by {requester}");

    Ok(id)
}

/// Link a request to a book. The missing -> found transition is terminal;
/// already-found requests are left untouched.
pub async fn fill(pool: &PgPool, id: i32, volume_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE requests SET book_id = $1, status = $2 WHERE id = $3")
        .bind(volume_id)
        .bind(STATUS_FOUND)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() > 0 {
        info!("Request {id} filled with {volume_id}");
    }

    Ok(result.rows_affected() > 0)
}
