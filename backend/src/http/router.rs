//! Router configuration for the HTTP API.
//!
//! Sets up all routes and middleware (CORS, compression, tracing), and
//! returns the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Upper bound on request bodies. Large batches stay well below it.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let api = Router::new()
        .route("/", get(handlers::api_root))
        .route("/health", get(handlers::health_check))
        .route("/me", get(handlers::me))
        .route("/add-data", post(handlers::add_data))
        .route("/readings", get(handlers::list_readings))
        .route("/readings/batch", post(handlers::create_batch))
        .route("/readings/my", get(handlers::my_readings))
        .route("/readings/my/daily", get(handlers::my_daily_counts))
        .route("/readings/location", get(handlers::readings_by_location))
        .route(
            "/readings/{id}",
            get(handlers::get_reading)
                .put(handlers::update_reading)
                .delete(handlers::delete_reading),
        )
        .route(
            "/scientist/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route("/analytics", get(handlers::analytics))
        .route("/indices", post(handlers::calculate_indices));

    Router::new()
        .nest("/api", api)
        // Older web clients post here.
        .route("/add-data", post(handlers::add_data))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
