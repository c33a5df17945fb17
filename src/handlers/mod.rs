pub mod announcements;
pub mod books;
pub mod messages;
pub mod requests;
pub mod users;

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{
    auth::CurrentUser,
    db,
    error::AppError,
    models::{Announcement, BookRequest},
    state::AppState,
};

#[derive(Serialize)]
pub struct HomePage {
    pub requests: Vec<BookRequest>,
    pub announcement: Option<Announcement>,
    /// Senders with unread messages, for the new-message banner.
    pub unread_from: Vec<String>,
}

/// Home projection: latest requests, the active announcement, and the
/// caller's unread-message notification.
pub async fn home(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<HomePage>, AppError> {
    let requests = db::requests::latest(&state.db, 100).await?;
    let announcement = db::announcements::active(&state.db).await?;
    let unread_from = db::messages::unopened(&state.db, &user.username).await?;

    Ok(Json(HomePage {
        requests,
        announcement,
        unread_from,
    }))
}
