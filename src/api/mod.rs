//! Admin HTTP API (§6): the response-callback webhook plus a small read/
//! control surface over the same state the dispatcher tasks run against.
//! The operator dashboard that only reads aggregate views is an external
//! collaborator (§1) — this module exposes the data it would read, nothing
//! more.

pub mod envelope;
pub mod handlers;
mod routes;

pub use handlers::AppState;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the complete application router, layering tracing, compression and
/// a permissive CORS policy over the route table.
pub fn create_app(state: AppState) -> Router {
    routes::routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
