use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderMap, HeaderValue,
    },
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::{
    auth::{CurrentUser, Writer},
    books_api, db,
    error::AppError,
    forms::{validate_payload, CollectBook, NewBook, NewReview},
    models::{Book, Review},
    state::AppState,
    storage,
};

#[derive(Serialize)]
pub struct BookPage {
    pub book: Book,
    pub reviews: Vec<Review>,
    /// Whether the viewing user already holds this book on their shelf.
    pub collected: bool,
}

pub async fn list_all(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(db::books::latest(&state.db, 1000).await?))
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(volume_id): Path<String>,
) -> Result<Json<BookPage>, AppError> {
    let book = db::books::get(&state.db, &volume_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let reviews = db::reviews::latest(&state.db, &volume_id, 50).await?;
    let collected = db::books::collection_contains(&state.db, &user.username, &volume_id).await?;

    Ok(Json(BookPage {
        book,
        reviews,
        collected,
    }))
}

/// Stream the stored file back, bumping the download counter.
pub async fn download(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Path(volume_id): Path<String>,
) -> Result<(HeaderMap, Vec<u8>), AppError> {
    let book = db::books::get(&state.db, &volume_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let Some(key) =
        storage::find_object(&state.storage, &state.config.book_bucket, &book.volume_id).await?
    else {
        warn!("Book requested for download has no stored file: {volume_id}");
        return Err(AppError::NotFound);
    };

    let Some(filename) = storage::download_filename(&book.title, &book.authors, &key) else {
        warn!("Stored key has no extension: {key}");
        return Err(AppError::NotFound);
    };

    db::books::increment_downloads(&state.db, &book.volume_id).await?;

    let data = storage::download_bytes(&state.storage, &state.config.book_bucket, &key).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
            .map_err(|e| AppError::Internal(Box::new(e)))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"));

    Ok((headers, data))
}

/// Prefill the new-book form from the books API.
pub async fn lookup(
    State(state): State<Arc<AppState>>,
    Writer(user): Writer,
    Path(volume_id): Path<String>,
) -> Result<Json<NewBook>, AppError> {
    let volume =
        books_api::lookup_volume(&state.http, &volume_id, &state.config.books_api_key).await?;

    Ok(Json(volume.into_new_book(&user.username)))
}

/// Create a book from a multipart upload: bibliographic fields plus the
/// file itself. When only a volume id is given, metadata is fetched and the
/// prefilled form is returned for review instead of inserting.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Writer(user): Writer,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut form = NewBook::default();
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::MalformedPayload)?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "epub" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|_| AppError::MalformedPayload)?;
            file = Some((filename, data.to_vec()));
            continue;
        }

        let value = field.text().await.map_err(|_| AppError::MalformedPayload)?;
        set_book_field(&mut form, &name, value);
    }

    form.uploader = user.username.clone();

    // Volume id alone means "fetch metadata for me".
    if form.title.is_empty() && !form.volume_id.is_empty() {
        let volume =
            books_api::lookup_volume(&state.http, &form.volume_id, &state.config.books_api_key)
                .await?;
        return Ok(Json(json!({ "prefill": volume.into_new_book(&user.username) })));
    }

    validate_payload(&form)?;

    let Some((filename, data)) = file else {
        let mut failures = std::collections::HashMap::new();
        failures.insert("epub".to_string(), "Book file is required".to_string());
        return Err(AppError::Validation(failures));
    };

    let key = storage::object_key(&form.volume_id, &filename);
    storage::upload_bytes(&state.storage, &state.config.book_bucket, &key, data).await?;

    db::books::insert(&state.db, &form).await?;

    Ok(Json(json!({ "volume_id": form.volume_id })))
}

/// Replace a book's bibliographic fields; the uploader never changes.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Writer(user): Writer,
    Json(mut payload): Json<NewBook>,
) -> Result<Json<Value>, AppError> {
    payload.uploader = user.username;
    validate_payload(&payload)?;

    let updated = db::books::update(&state.db, &payload).await?;
    if !updated {
        return Err(AppError::NotFound);
    }

    Ok(Json(json!({ "volume_id": payload.volume_id })))
}

pub async fn collect(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(volume_id): Path<String>,
    Json(payload): Json<CollectBook>,
) -> Result<Json<Value>, AppError> {
    db::books::get(&state.db, &volume_id)
        .await?
        .ok_or(AppError::NotFound)?;

    db::books::collect(&state.db, &user.username, &volume_id, &payload.year).await?;

    Ok(Json(json!({ "status": "collected" })))
}

pub async fn create_review(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(payload): Json<NewReview>,
) -> Result<Json<Value>, AppError> {
    validate_payload(&payload)?;

    let id = db::reviews::insert(
        &state.db,
        &payload.book_id,
        &user.username,
        &payload.rating,
        &payload.review,
    )
    .await?;

    Ok(Json(json!({ "id": id })))
}

fn set_book_field(form: &mut NewBook, name: &str, value: String) {
    match name {
        "volume_id" => form.volume_id = value,
        "title" => form.title = value,
        "subtitle" => form.subtitle = value,
        "publisher" => form.publisher = value,
        "published_date" => form.published_date = value,
        "page_count" => form.page_count = value,
        "maturity_rating" => form.maturity_rating = value,
        "authors" => form.authors = value,
        "categories" => form.categories = value,
        "description" => form.description = value,
        "price" => form.price = value,
        "isbn10" => form.isbn10 = value,
        "isbn13" => form.isbn13 = value,
        "image_link" => form.image_link = value,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multipart_fields_map_onto_form() {
        let mut form = NewBook::default();
        set_book_field(&mut form, "volume_id", "vol-42".into());
        set_book_field(&mut form, "title", "Dune".into());
        set_book_field(&mut form, "isbn13", "9780441013593".into());
        set_book_field(&mut form, "bogus", "ignored".into());

        assert_eq!(form.volume_id, "vol-42");
        assert_eq!(form.title, "Dune");
        assert_eq!(form.isbn13, "9780441013593");
    }
}
