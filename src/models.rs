use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const ROLE_READER: &str = "reader";
pub const ROLE_WRITER: &str = "writer";

pub const STATUS_MISSING: &str = "missing";
pub const STATUS_FOUND: &str = "found";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created: DateTime<Utc>,
}

impl User {
    pub fn is_writer(&self) -> bool {
        self.role == ROLE_WRITER
    }
}

/// Server-side session row; the cookie carries only the id.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub username: String,
    pub expires_at: DateTime<Utc>,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Invite {
    pub id: i32,
    pub code: String,
    pub creator: String,
    pub username: Option<String>,
    pub used: bool,
    pub activated: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BookRequest {
    pub id: i32,
    pub requester: String,
    pub title: String,
    pub status: String,
    pub book_id: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Book {
    pub id: i32,
    pub volume_id: String,
    pub title: String,
    pub subtitle: String,
    pub publisher: String,
    pub published_date: String,
    pub page_count: String,
    pub maturity_rating: String,
    pub authors: String,
    pub categories: String,
    pub description: String,
    pub uploader: String,
    pub price: String,
    pub isbn10: String,
    pub isbn13: String,
    pub image_link: String,
    pub downloads: i32,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Review {
    pub id: i32,
    pub book_id: String,
    pub username: String,
    pub rating: String,
    pub review: String,
    pub created: DateTime<Utc>,
}

/// A user's review joined against the book title.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserReview {
    pub id: i32,
    pub book_id: String,
    pub rating: String,
    pub review: String,
    pub created: DateTime<Utc>,
    pub title: String,
}

/// Entry on a user's personal shelf.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CollectionEntry {
    pub volume_id: String,
    pub title: String,
    pub image_link: String,
    pub year: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Message {
    pub id: i32,
    pub sender: String,
    pub receiver: String,
    pub read: bool,
    pub content: String,
    pub created: DateTime<Utc>,
}

/// A conversation partner, flagged when they have unread messages waiting.
#[derive(Debug, Clone, Serialize)]
pub struct Thread {
    pub correspondent: String,
    pub unread: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Announcement {
    pub id: i32,
    pub author: String,
    pub content: String,
    pub active: bool,
    pub created: DateTime<Utc>,
}

/// JWT claims for the API token surface.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub role: String,
    pub exp: i64,
    pub iss: String,
}
