use axum::body::Body;
use axum::http::{header, Method};
use axum::response::Response;
use axum::{extract::FromRef, http::StatusCode, routing::get, Router};
use prometheus::{Encoder, TextEncoder};
use routes::{auth_router, files_router, profile_router, quiz_router};
use sqlx::SqlitePool;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::routes;

pub const PORT: u16 = 3000;

/// Upload directory, newtyped so it can be extracted with `FromRef` next to
/// the static directory.
#[derive(Clone)]
pub struct UploadDir(pub PathBuf);

#[derive(FromRef, Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub upload_dir: UploadDir,
    pub static_dir: PathBuf,
}

pub fn app(state: AppState) -> Router {
    // The original ran with `origin: "*", credentials: true`; browsers reject
    // that combination literally, so the origin is mirrored instead.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    Router::new()
        .route("/", get(index))
        .route("/metrics", get(metrics))
        .nest_service("/static", ServeDir::new(state.static_dir.clone()))
        .merge(auth_router(state.clone()))
        .merge(profile_router(state.clone()))
        .merge(quiz_router(state.clone()))
        .merge(files_router(state))
        .fallback(|| async {
            tracing::info!("Fallback");
            StatusCode::NOT_FOUND
        })
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn run_server(state: AppState) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{PORT}");
    let app = app(state);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Serving on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> &'static str {
    "Hello world!"
}

async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metrics = prometheus::gather();
    let mut buf = vec![];
    encoder.encode(&metrics, &mut buf).unwrap();
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, encoder.format_type())
        .body(Body::from(buf))
        .unwrap()
}
