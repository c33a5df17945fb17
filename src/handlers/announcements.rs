use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    auth::{CurrentUser, Writer},
    db,
    error::AppError,
    forms::{validate_payload, NewAnnouncement},
    models::Announcement,
    state::AppState,
};

pub async fn active(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
) -> Result<Json<Option<Announcement>>, AppError> {
    Ok(Json(db::announcements::active(&state.db).await?))
}

/// Post a new site-wide announcement, replacing the current active one.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Writer(user): Writer,
    Json(payload): Json<NewAnnouncement>,
) -> Result<Json<Value>, AppError> {
    validate_payload(&payload)?;

    let id = db::announcements::insert(&state.db, &user.username, &payload.content).await?;

    Ok(Json(json!({ "id": id })))
}
