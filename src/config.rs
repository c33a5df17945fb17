use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub storage_endpoint: String,
    pub storage_region: String,
    pub storage_key: String,
    pub storage_secret: String,
    pub book_bucket: String,
    pub books_api_key: String,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("LIBRARY_PORT", "4000"),
            database_url: try_load("DATABASE_URL", "postgres://localhost/library"),
            storage_endpoint: try_load("STORAGE_ENDPOINT", "http://localhost:9000"),
            storage_region: try_load("STORAGE_REGION", "us-east-1"),
            storage_key: load_secret("STORAGE_KEY", "key"),
            storage_secret: load_secret("STORAGE_SECRET", "secret"),
            book_bucket: try_load("BOOK_BUCKET", "library"),
            books_api_key: load_secret("BOOKS_API_KEY", ""),
            jwt_secret: load_secret("JWT_SECRET", "supersecure"),
            session_ttl_hours: try_load("SESSION_TTL_HOURS", "24"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

/// Secrets come from the environment directly or from a mounted
/// `/run/secrets/<NAME>` file, in that order.
fn load_secret(secret_name: &str, default: &str) -> String {
    if let Ok(value) = env::var(secret_name) {
        return value;
    }

    let path = format!("/run/secrets/{secret_name}");
    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|_| {
            warn!("{secret_name} not set, using default");
            default.to_string()
        })
}
