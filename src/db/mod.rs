//! Query layer over the Postgres pool. One module per entity; every
//! function takes the pool (or an open transaction) explicitly.

pub mod announcements;
pub mod books;
pub mod invites;
pub mod messages;
pub mod requests;
pub mod reviews;
pub mod sessions;
pub mod users;

use sqlx::postgres::{PgPool, PgPoolOptions};

pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}
