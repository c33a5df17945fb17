use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use sqlx::PgPool;
use tracing::info;

use crate::{config::Config, db};

pub struct AppState {
    pub config: Config,
    pub db: PgPool,
    pub storage: aws_sdk_s3::Client,
    pub http: reqwest::Client,
}

impl AppState {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        info!("Connecting to database...");
        let db = db::connect(&config.database_url)
            .await
            .expect("Database misconfigured!");

        let storage = init_storage(&config);
        let http = reqwest::Client::new();

        Arc::new(Self {
            config,
            db,
            storage,
            http,
        })
    }
}

/// S3-compatible client: static credentials, custom endpoint, path-style
/// addressing for self-hosted stores.
fn init_storage(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        config.storage_key.clone(),
        config.storage_secret.clone(),
        None,
        None,
        "static",
    );

    let s3_config = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(config.storage_region.clone()))
        .endpoint_url(&config.storage_endpoint)
        .credentials_provider(credentials)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
