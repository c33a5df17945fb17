use sqlx::PgPool;
use tracing::info;

use crate::models::{Review, UserReview};

pub async fn insert(
    pool: &PgPool,
    book_id: &str,
    username: &str,
    rating: &str,
    review: &str,
) -> Result<i32, sqlx::Error> {
    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO reviews (book_id, username, rating, review) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(book_id)
    .bind(username)
    .bind(rating)
    .bind(review)
    .fetch_one(pool)
    .await?;

    info!("New review added by {username}");

    Ok(id)
}

pub async fn latest(pool: &PgPool, book_id: &str, limit: i64) -> Result<Vec<Review>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, book_id, username, rating, review, created FROM reviews
         WHERE book_id = $1 ORDER BY created DESC LIMIT $2",
    )
    .bind(book_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn latest_by_user(
    pool: &PgPool,
    username: &str,
    limit: i64,
) -> Result<Vec<UserReview>, sqlx::Error> {
    sqlx::query_as(
        "SELECT r.id, r.book_id, r.rating, r.review, r.created, b.title FROM reviews r
         INNER JOIN books b ON r.book_id = b.volume_id
         WHERE r.username = $1 ORDER BY r.created DESC LIMIT $2",
    )
    .bind(username)
    .bind(limit)
    .fetch_all(pool)
    .await
}
