//! Router wiring for the admin API and the response-callback webhook (§6).

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, AppState};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/webhook/response", post(handlers::response_webhook))
        .route("/subscribers", post(handlers::subscribe))
        .route("/status", get(handlers::status))
        .route("/posture_status", get(handlers::posture_status))
        .route("/emotion_status", get(handlers::emotion_status))
        .route("/stats/:user_id", get(handlers::stats))
        .route("/recommendation/:user_id", post(handlers::force_recommendation))
        .route("/config", get(handlers::config_dump))
        .route("/model_status", get(handlers::model_status))
        .route("/leaderboard", get(handlers::leaderboard))
        .with_state(state)
}
