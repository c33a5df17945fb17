use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    auth::CurrentUser,
    db,
    error::AppError,
    forms::{validate_payload, NewMessage},
    models::{Message, Thread},
    state::AppState,
};

#[derive(Serialize)]
pub struct Conversation {
    pub with: String,
    pub messages: Vec<Message>,
    pub threads: Vec<Thread>,
}

/// Fetch a conversation, then explicitly mark the other side's messages
/// read. The returned payload reflects the state before marking.
pub async fn conversation(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(receiver): Path<String>,
) -> Result<Json<Conversation>, AppError> {
    db::users::get(&state.db, &receiver)
        .await?
        .ok_or(AppError::NotFound)?;

    let messages = db::messages::conversation(&state.db, &user.username, &receiver).await?;
    db::messages::mark_read(&state.db, &user.username, &receiver).await?;

    let threads = db::messages::threads(&state.db, &user.username).await?;

    Ok(Json(Conversation {
        with: receiver,
        messages,
        threads,
    }))
}

pub async fn send(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(receiver): Path<String>,
    Json(payload): Json<NewMessage>,
) -> Result<Json<Value>, AppError> {
    validate_payload(&payload)?;

    db::users::get(&state.db, &receiver)
        .await?
        .ok_or(AppError::NotFound)?;

    db::messages::insert(&state.db, &user.username, &receiver, &payload.content).await?;

    Ok(Json(json!({ "status": "sent" })))
}

pub async fn threads(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<Vec<Thread>>, AppError> {
    Ok(Json(db::messages::threads(&state.db, &user.username).await?))
}

pub async fn unread(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(
        db::messages::unopened(&state.db, &user.username).await?,
    ))
}
