use sqlx::PgPool;
use tracing::info;

use crate::forms::NewBook;
use crate::models::{Book, CollectionEntry};

const BOOK_COLUMNS: &str = "id, volume_id, title, subtitle, publisher, published_date, page_count,
    maturity_rating, authors, categories, description, uploader, price, isbn10, isbn13,
    image_link, downloads, created";

pub async fn get(pool: &PgPool, volume_id: &str) -> Result<Option<Book>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {BOOK_COLUMNS} FROM books WHERE volume_id = $1"
    ))
    .bind(volume_id)
    .fetch_optional(pool)
    .await
}

pub async fn latest(pool: &PgPool, limit: i64) -> Result<Vec<Book>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {BOOK_COLUMNS} FROM books ORDER BY created DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn insert(pool: &PgPool, book: &NewBook) -> Result<i32, sqlx::Error> {
    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO books (volume_id, title, subtitle, publisher, published_date, page_count,
            maturity_rating, authors, categories, description, uploader, price, isbn10, isbn13,
            image_link, downloads)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, 0)
         RETURNING id",
    )
    .bind(&book.volume_id)
    .bind(&book.title)
    .bind(&book.subtitle)
    .bind(&book.publisher)
    .bind(&book.published_date)
    .bind(&book.page_count)
    .bind(&book.maturity_rating)
    .bind(&book.authors)
    .bind(&book.categories)
    .bind(&book.description)
    .bind(&book.uploader)
    .bind(&book.price)
    .bind(&book.isbn10)
    .bind(&book.isbn13)
    .bind(&book.image_link)
    .fetch_one(pool)
    .await?;

    info!("New book {} uploaded by {}", book.title, book.uploader);

    Ok(id)
}

/// Replace the mutable bibliographic fields; uploader is preserved.
pub async fn update(pool: &PgPool, book: &NewBook) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE books SET title = $1, subtitle = $2, publisher = $3, published_date = $4,
            page_count = $5, maturity_rating = $6, authors = $7, categories = $8,
            description = $9, price = $10, isbn10 = $11, isbn13 = $12, image_link = $13
         WHERE volume_id = $14",
    )
    .bind(&book.title)
    .bind(&book.subtitle)
    .bind(&book.publisher)
    .bind(&book.published_date)
    .bind(&book.page_count)
    .bind(&book.maturity_rating)
    .bind(&book.authors)
    .bind(&book.categories)
    .bind(&book.description)
    .bind(&book.price)
    .bind(&book.isbn10)
    .bind(&book.isbn13)
    .bind(&book.image_link)
    .bind(&book.volume_id)
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        info!("Book {} edited", book.title);
    }

    Ok(result.rows_affected() > 0)
}

pub async fn increment_downloads(pool: &PgPool, volume_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE books SET downloads = downloads + 1 WHERE volume_id = $1")
        .bind(volume_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn collect(
    pool: &PgPool,
    username: &str,
    volume_id: &str,
    year: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO collection (username, volume_id, year) VALUES ($1, $2, $3)
         ON CONFLICT (username, volume_id) DO NOTHING",
    )
    .bind(username)
    .bind(volume_id)
    .bind(year)
    .execute(pool)
    .await?;

    info!("{username} collected book {volume_id}");

    Ok(())
}

pub async fn collection_contains(
    pool: &PgPool,
    username: &str,
    volume_id: &str,
) -> Result<bool, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT volume_id FROM collection WHERE username = $1 AND volume_id = $2",
    )
    .bind(username)
    .bind(volume_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

pub async fn collection(pool: &PgPool, username: &str) -> Result<Vec<CollectionEntry>, sqlx::Error> {
    sqlx::query_as(
        "SELECT c.volume_id, b.title, b.image_link, c.year FROM collection c
         INNER JOIN books b ON c.volume_id = b.volume_id WHERE c.username = $1
         ORDER BY c.created DESC",
    )
    .bind(username)
    .fetch_all(pool)
    .await
}
