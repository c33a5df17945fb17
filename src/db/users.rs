use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

use crate::models::{User, ROLE_READER};

/// Insert a new user with the default reader role. Runs inside the signup
/// transaction so a failed invite redemption rolls the user back too.
pub async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<i32, sqlx::Error> {
    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO users (username, email, password_hash, role) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(ROLE_READER)
    .fetch_one(&mut **tx)
    .await?;

    info!("User {username} registered");

    Ok(id)
}

pub async fn get(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, username, email, password_hash, role, created FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}
