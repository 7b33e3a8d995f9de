//! reva-server library - review ingestion and aggregation service
//!
//! Wires the CSV codec, classifier client, ingestion pipeline, and
//! aggregation repository behind an axum HTTP API.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use reva_common::config::DEFAULT_MAX_UPLOAD_BYTES;

pub mod api;
pub mod codec;
pub mod db;
pub mod services;

use services::ClassifierClient;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Client for the external classification service
    pub classifier: ClassifierClient,
    /// Upload size ceiling in bytes
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(db: SqlitePool, classifier: ClassifierClient) -> Self {
        Self {
            db,
            classifier,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_upload_limit(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    // The original host allowed any origin; the dashboard is served separately
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/groups/upload", post(api::groups::upload_csv))
        .route("/api/groups", get(api::groups::list_groups))
        .route("/api/groups/:group_id", delete(api::groups::delete_group))
        .route("/api/reviews/:group_id", get(api::reviews::get_by_group))
        .route("/api/reviews/by-title/:title", get(api::reviews::get_by_title))
        .route("/api/reviews/export-stream", get(api::reviews::export_stream))
        .route("/api/reviews/review-count", get(api::reviews::review_count))
        .route("/api/reviews/label-count", get(api::reviews::label_count))
        .route(
            "/api/reviews/percent-positive",
            get(api::reviews::percent_positive),
        )
        .route(
            "/api/reviews/source-percentages",
            get(api::reviews::source_percentages),
        )
        .route("/api/reviews/parse-one", post(api::reviews::parse_one))
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
