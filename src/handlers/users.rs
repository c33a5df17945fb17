use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    auth::{self, CurrentUser, SESSION_COOKIE},
    db::{self, invites::InviteStatus},
    error::AppError,
    forms::{validate_payload, NewUser, UserLogin},
    models::{CollectionEntry, Invite, User, UserReview},
    state::AppState,
};

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Serialize)]
pub struct TokenInfo {
    pub valid: bool,
    pub time_left: i64,
}

#[derive(Serialize)]
pub struct UserPage {
    pub user: User,
    pub reviews: Vec<UserReview>,
    pub collection: Vec<CollectionEntry>,
    /// Only present when a user views their own page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invites: Option<Vec<Invite>>,
}

/// Signup, gated by an unused invite code. The user insert and the invite
/// redemption commit together or not at all.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewUser>,
) -> Result<Json<Value>, AppError> {
    validate_payload(&payload)?;

    match db::invites::validate(&state.db, &payload.code).await? {
        InviteStatus::Unused => {}
        InviteStatus::Used | InviteStatus::Unknown => return Err(AppError::InvalidInvite),
    }

    let password_hash = auth::hash_password(&payload.password)?;

    let mut tx = state.db.begin().await?;
    db::users::insert(&mut tx, &payload.username, &payload.email, &password_hash).await?;

    // A concurrent signup may have consumed the code after the validate
    // call above; losing the race rolls the user insert back too.
    let filled = db::invites::fill(&mut tx, &payload.username, &payload.code).await?;
    if !filled {
        return Err(AppError::InvalidInvite);
    }

    tx.commit().await?;

    Ok(Json(json!({ "status": "success" })))
}

/// Login issues both a server-side session (cookie) and a JWT for API use.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<UserLogin>,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    let Some(user) = auth::authenticate(&state.db, &payload.username, &payload.password).await?
    else {
        return Err(AppError::Unauthorized);
    };

    let session =
        db::sessions::create(&state.db, &user.username, state.config.session_ttl_hours).await?;
    let token = auth::sign_jwt(&state.config.jwt_secret, &user.username, &user.role)?;

    let cookie = auth::session_cookie(session.id.to_string());

    Ok((jar.add(cookie), Json(TokenResponse { token })))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Value>), AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Ok(id) = Uuid::parse_str(cookie.value()) {
            db::sessions::delete(&state.db, id).await?;
        }
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/").build());

    Ok((jar, Json(json!({ "status": "logged out" }))))
}

/// Exchange Basic credentials for a signed JWT.
pub async fn get_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let (username, password) = auth::parse_basic_auth(header).ok_or(AppError::Unauthorized)?;

    let Some(user) = auth::authenticate(&state.db, &username, &password).await? else {
        return Err(AppError::Unauthorized);
    };

    let token = auth::sign_jwt(&state.config.jwt_secret, &user.username, &user.role)?;

    Ok(Json(TokenResponse { token }))
}

/// Report validity and remaining lifetime of a presented token.
pub async fn validate_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<TokenInfo>, AppError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    let claims = auth::verify_jwt(&state.config.jwt_secret, token)?;

    Ok(Json(TokenInfo {
        valid: true,
        time_left: auth::seconds_remaining(&claims),
    }))
}

pub async fn show_user(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(username): Path<String>,
) -> Result<Json<UserPage>, AppError> {
    let user = db::users::get(&state.db, &username)
        .await?
        .ok_or(AppError::NotFound)?;

    let reviews = db::reviews::latest_by_user(&state.db, &username, 50).await?;
    let collection = db::books::collection(&state.db, &username).await?;

    // Invite codes are private to their creator.
    let invites = if current.username == username {
        Some(db::invites::for_creator(&state.db, &username).await?)
    } else {
        None
    };

    Ok(Json(UserPage {
        user,
        reviews,
        collection,
        invites,
    }))
}

/// Generate a fresh single-use invite code for the caller.
pub async fn create_invite(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<Value>, AppError> {
    let code = Uuid::new_v4().to_string();
    db::invites::create(&state.db, &user.username, &code).await?;

    Ok(Json(json!({ "code": code })))
}
