use std::sync::Arc;

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::{
    db,
    error::AppError,
    models::{Claims, User},
    state::AppState,
};

pub const SESSION_COOKIE: &str = "library_session";

/// Session cookie carrying a freshly created session id. HttpOnly keeps it
/// away from scripts; Lax stops it riding along on cross-site POSTs.
pub fn session_cookie(id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

const BCRYPT_COST: u32 = 12;
const JWT_ISSUER: &str = "louieslibrary";
const JWT_TTL_SECONDS: i64 = 86400;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    bcrypt::hash(password, BCRYPT_COST).map_err(|e| AppError::Internal(Box::new(e)))
}

/// Check a login attempt. Unknown usernames and wrong passwords both come
/// back as `None`; bcrypt verification itself is the only distinction the
/// caller ever sees.
pub async fn authenticate(
    pool: &PgPool,
    username: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    let Some(user) = db::users::get(pool, username).await? else {
        return Ok(None);
    };

    let matches =
        bcrypt::verify(password, &user.password_hash).map_err(|e| AppError::Internal(Box::new(e)))?;
    if !matches {
        return Ok(None);
    }

    info!("User {username} logged in");

    Ok(Some(user))
}

pub fn sign_jwt(secret: &str, username: &str, role: &str) -> Result<String, AppError> {
    let claims = Claims {
        username: username.to_string(),
        role: role.to_string(),
        exp: Utc::now().timestamp() + JWT_TTL_SECONDS,
        iss: JWT_ISSUER.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(Box::new(e)))
}

/// Decode and check a token. Fails closed on signature mismatch, expiry,
/// or a foreign issuer.
pub fn verify_jwt(secret: &str, token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::default();
    validation.set_issuer(&[JWT_ISSUER]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

/// Seconds until a verified token expires.
pub fn seconds_remaining(claims: &Claims) -> i64 {
    claims.exp - Utc::now().timestamp()
}

/// Pull `username:password` out of a Basic authorization header value.
pub fn parse_basic_auth(header: &str) -> Option<(String, String)> {
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = BASE64.decode(encoded).ok()?;
    let pair = String::from_utf8(decoded).ok()?;
    let (username, password) = pair.split_once(':')?;

    Some((username.to_string(), password.to_string()))
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// The authenticated caller, resolved from the session cookie or from a
/// Bearer JWT. Handlers take this as an extractor; missing or stale
/// credentials reject with 401 before the handler runs.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub username: String,
    pub role: String,
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // Session cookie first, the browser path.
        let jar = CookieJar::from_headers(&parts.headers);
        if let Some(cookie) = jar.get(SESSION_COOKIE) {
            if let Ok(id) = Uuid::parse_str(cookie.value()) {
                if let Some(session) = db::sessions::get(&state.db, id).await? {
                    if let Some(user) = db::users::get(&state.db, &session.username).await? {
                        return Ok(CurrentUser {
                            username: user.username,
                            role: user.role,
                        });
                    }
                }
            }
        }

        // Then the API path: a Bearer token carries username and role itself.
        if let Some(token) = bearer_token(parts) {
            let claims = verify_jwt(&state.config.jwt_secret, token)?;
            return Ok(CurrentUser {
                username: claims.username,
                role: claims.role,
            });
        }

        Err(AppError::Unauthorized)
    }
}

/// Extractor for writer-gated routes. Wraps [`CurrentUser`] and rejects
/// readers with 403.
#[derive(Debug, Clone)]
pub struct Writer(pub CurrentUser);

impl FromRequestParts<Arc<AppState>> for Writer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != crate::models::ROLE_WRITER {
            return Err(AppError::Forbidden);
        }

        Ok(Writer(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_scoped_and_http_only() {
        let cookie = session_cookie("abc-123".to_string());

        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc-123");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }

    #[test]
    fn jwt_round_trip() {
        let token = sign_jwt("secret", "alice", "writer").unwrap();
        let claims = verify_jwt("secret", &token).unwrap();

        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, "writer");
        assert!(seconds_remaining(&claims) > 0);
        assert!(seconds_remaining(&claims) <= JWT_TTL_SECONDS);
    }

    #[test]
    fn jwt_rejects_wrong_secret() {
        let token = sign_jwt("secret", "alice", "reader").unwrap();
        assert!(verify_jwt("other", &token).is_err());
    }

    #[test]
    fn jwt_rejects_garbage() {
        assert!(verify_jwt("secret", "not-a-token").is_err());
    }

    #[test]
    fn password_hash_verifies() {
        // Low cost keeps the test quick; production uses BCRYPT_COST.
        let hash = bcrypt::hash("hunter2boogaloo", 4).unwrap();

        assert!(bcrypt::verify("hunter2boogaloo", &hash).unwrap());
        assert!(!bcrypt::verify("wrong-password", &hash).unwrap());
    }

    #[test]
    fn basic_auth_parses() {
        let header = format!("Basic {}", BASE64.encode("bob:pa55word"));
        let (username, password) = parse_basic_auth(&header).unwrap();

        assert_eq!(username, "bob");
        assert_eq!(password, "pa55word");
    }

    #[test]
    fn basic_auth_rejects_bearer() {
        assert!(parse_basic_auth("Bearer abc123").is_none());
    }
}
