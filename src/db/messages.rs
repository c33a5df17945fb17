use sqlx::PgPool;
use tracing::info;

use crate::models::{Message, Thread};

pub async fn insert(
    pool: &PgPool,
    sender: &str,
    receiver: &str,
    content: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO messages (sender, receiver, read, content) VALUES ($1, $2, FALSE, $3)")
        .bind(sender)
        .bind(receiver)
        .bind(content)
        .execute(pool)
        .await?;

    info!("{sender} sent a message to {receiver}");

    Ok(())
}

/// All messages between the pair, oldest first. Viewing does not mutate
/// read state; callers follow up with [`mark_read`] explicitly.
pub async fn conversation(
    pool: &PgPool,
    a: &str,
    b: &str,
) -> Result<Vec<Message>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, sender, receiver, read, content, created FROM messages
         WHERE (sender = $1 AND receiver = $2) OR (sender = $2 AND receiver = $1)
         ORDER BY created ASC",
    )
    .bind(a)
    .bind(b)
    .fetch_all(pool)
    .await
}

/// Mark everything the given sender sent to the receiver as read.
pub async fn mark_read(pool: &PgPool, receiver: &str, sender: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE messages SET read = TRUE WHERE sender = $1 AND receiver = $2")
        .bind(sender)
        .bind(receiver)
        .execute(pool)
        .await?;

    Ok(())
}

/// The distinct set of correspondents, unioned across both directions and
/// flagged when they have unread messages waiting.
pub async fn threads(pool: &PgPool, username: &str) -> Result<Vec<Thread>, sqlx::Error> {
    let correspondents: Vec<(String,)> = sqlx::query_as(
        "SELECT DISTINCT sender FROM messages WHERE receiver = $1
         UNION
         SELECT DISTINCT receiver FROM messages WHERE sender = $1",
    )
    .bind(username)
    .fetch_all(pool)
    .await?;

    let unread = unopened(pool, username).await?;

    Ok(correspondents
        .into_iter()
        .map(|(correspondent,)| {
            let has_unread = unread.contains(&correspondent);
            Thread {
                correspondent,
                unread: has_unread,
            }
        })
        .collect())
}

/// Senders with unread messages for the given receiver, for the new-message
/// notification banner.
pub async fn unopened(pool: &PgPool, receiver: &str) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT DISTINCT sender FROM messages WHERE receiver = $1 AND read = FALSE",
    )
    .bind(receiver)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(sender,)| sender).collect())
}
