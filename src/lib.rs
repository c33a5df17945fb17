//! Louie's Library: a self-hosted book request, cataloging, and lending
//! service. Users file requests, writers fulfill them by uploading book
//! files, and readers browse, download, review, collect, and message.

use std::{net::SocketAddr, time::Duration};

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS},
        HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};

use signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub mod auth;
pub mod books_api;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod state;
pub mod storage;

use handlers::{announcements, books, messages, requests, users};
use state::AppState;

// Uploads are capped at 50mb.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await;

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/", get(handlers::home))
        // Requests
        .route("/request/all", get(requests::list_all))
        .route("/request/new", post(requests::create))
        .route("/request/{id}", get(requests::show))
        .route("/request/{id}/fill", post(requests::fill))
        // Books
        .route("/book/all", get(books::list_all))
        .route("/book/review", post(books::create_review))
        .route("/book/edit", post(books::update))
        .route("/book/lookup/{volumeid}", get(books::lookup))
        .route("/book/collect/{volumeid}", post(books::collect))
        .route("/book/{volumeid}", get(books::show).post(books::download))
        .route("/write/book", post(books::create))
        // Messages
        .route("/messages/threads", get(messages::threads))
        .route("/messages/unread", get(messages::unread))
        .route(
            "/messages/{receiver}",
            get(messages::conversation).post(messages::send),
        )
        // Announcements
        .route("/announcement", get(announcements::active))
        .route("/announcement/new", post(announcements::create))
        // Users
        .route("/user/signup", post(users::signup))
        .route("/user/login", post(users::login))
        .route("/user/logout", get(users::logout))
        .route("/user/invite/create", post(users::create_invite))
        .route("/user/token", get(users::get_token))
        .route("/user/token/validate", get(users::validate_token))
        .route("/user/{username}", get(users::show_user))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(SetResponseHeaderLayer::overriding(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("deny"),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
