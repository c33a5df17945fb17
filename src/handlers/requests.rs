use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{ConnectInfo, Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    auth::{CurrentUser, Writer},
    db,
    error::AppError,
    forms::{validate_payload, FillRequest, NewRequest},
    models::BookRequest,
    state::AppState,
};

pub async fn list_all(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
) -> Result<Json<Vec<BookRequest>>, AppError> {
    Ok(Json(db::requests::latest(&state.db, 1000).await?))
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<BookRequest>, AppError> {
    if id < 1 {
        return Err(AppError::NotFound);
    }

    let request = db::requests::get(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(request))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<NewRequest>,
) -> Result<Json<Value>, AppError> {
    validate_payload(&payload)?;

    let id = db::requests::insert(
        &state.db,
        &user.username,
        &payload.title,
        &addr.to_string(),
    )
    .await?;

    Ok(Json(json!({ "id": id })))
}

/// Writer-only fulfillment: links a book and moves the request to found.
pub async fn fill(
    State(state): State<Arc<AppState>>,
    Writer(_user): Writer,
    Path(id): Path<i32>,
    Json(payload): Json<FillRequest>,
) -> Result<Json<Value>, AppError> {
    let filled = db::requests::fill(&state.db, id, &payload.book_id).await?;
    if !filled {
        return Err(AppError::NotFound);
    }

    Ok(Json(json!({ "status": "filled" })))
}
