//! HTTP handlers for the admin API and the response-callback webhook (§6).
//!
//! The chat transport itself is out of scope (§1); this surface is what a
//! transport adapter (or an operator dashboard) calls into.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::command::{self, CommandContext};
use crate::dispatcher::DispatcherContext;
use crate::gamification;

use super::envelope::{ApiErrorResponse, ApiResponse};

pub type AppState = Arc<DispatcherContext>;

fn command_ctx(state: &DispatcherContext) -> CommandContext<'_> {
    CommandContext {
        gateway: state.gateway.as_ref(),
        scorer: state.scorer.as_ref(),
        cooldown: state.cooldown.as_ref(),
        subscribers: state.subscribers.as_ref(),
    }
}

#[derive(Debug, Deserialize)]
pub struct ResponseCallback {
    pub recommendation_id: String,
    pub subscriber_id: String,
    pub response: String,
}

/// `POST /webhook/response` — the response-callback endpoint the chat
/// transport posts to after a button click (§4.I).
pub async fn response_webhook(State(state): State<AppState>, Json(body): Json<ResponseCallback>) -> Response {
    match crate::ingest::ingest_response(state.gateway.as_ref(), &body.recommendation_id, &body.subscriber_id, &body.response, Utc::now()).await {
        Ok(outcome) => ApiResponse::ok(serde_json::json!({
            "triggered_user_id": outcome.triggered_user_id,
            "fell_back": outcome.fell_back,
            "new_points": outcome.new_points,
        })),
        Err(crate::ingest::IngestError::UnknownVerb(v)) => ApiErrorResponse::bad_request(format!("unknown response verb: {v}")),
        Err(crate::ingest::IngestError::Gateway(e)) => ApiErrorResponse::service_unavailable(e.to_string()),
    }
}

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub subscriber_id: i64,
}

/// `POST /subscribers` — the `start` command (§6).
pub async fn subscribe(State(state): State<AppState>, Json(body): Json<SubscribeRequest>) -> Response {
    match state.subscribers.add(body.subscriber_id) {
        Ok(_) => ApiResponse::ok(serde_json::json!({"subscribed": true})),
        Err(e) => ApiErrorResponse::internal(e.to_string()),
    }
}

/// `GET /status` — combined posture + emotion window summary (§6).
pub async fn status(State(state): State<AppState>) -> Response {
    let ctx = command_ctx(&state);
    match command::status(&ctx, Utc::now()).await {
        Ok(text) => ApiResponse::ok(serde_json::json!({"summary": text})),
        Err(e) => ApiErrorResponse::service_unavailable(e.to_string()),
    }
}

pub async fn posture_status(State(state): State<AppState>) -> Response {
    let ctx = command_ctx(&state);
    match command::posture_status(&ctx, Utc::now()).await {
        Ok(text) => ApiResponse::ok(serde_json::json!({"summary": text})),
        Err(e) => ApiErrorResponse::service_unavailable(e.to_string()),
    }
}

pub async fn emotion_status(State(state): State<AppState>) -> Response {
    let ctx = command_ctx(&state);
    match command::emotion_status(&ctx, Utc::now()).await {
        Ok(text) => ApiResponse::ok(serde_json::json!({"summary": text})),
        Err(e) => ApiErrorResponse::service_unavailable(e.to_string()),
    }
}

/// `GET /stats/:user_id` — last-30-day accept/postpone/reject counts (§6).
pub async fn stats(State(state): State<AppState>, Path(user_id): Path<String>) -> Response {
    let ctx = command_ctx(&state);
    match command::stats(&ctx, &user_id).await {
        Ok(text) => ApiResponse::ok(serde_json::json!({"summary": text})),
        Err(e) => ApiErrorResponse::service_unavailable(e.to_string()),
    }
}

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub subscriber_id: String,
}

/// `POST /recommendation/:user_id` — forces a one-off recommendation (§6).
pub async fn force_recommendation(State(state): State<AppState>, Path(user_id): Path<String>, Json(body): Json<RecommendationRequest>) -> Response {
    let ctx = command_ctx(&state);
    match command::force_recommendation(&ctx, &body.subscriber_id, &user_id, Utc::now()).await {
        Ok(text) => ApiResponse::ok(serde_json::json!({"message": text})),
        Err(e) => ApiErrorResponse::service_unavailable(e.to_string()),
    }
}

/// `GET /config` — current thresholds and cooldowns (§6).
pub async fn config_dump() -> Response {
    ApiResponse::ok(serde_json::json!({"config": command::config_dump()}))
}

/// `GET /model_status` — model readiness (§6).
pub async fn model_status(State(state): State<AppState>) -> Response {
    ApiResponse::ok(serde_json::json!({"status": command::model_status(state.scorer.as_ref())}))
}

/// `GET /leaderboard` — gamification leaderboard (§4.J).
pub async fn leaderboard(State(state): State<AppState>) -> Response {
    match gamification::leaderboard(state.gateway.as_ref()).await {
        Ok(entries) => ApiResponse::ok(entries.into_iter().map(|e| serde_json::json!({
            "user_id": e.user_id,
            "display_name": e.display_name,
            "points": e.points,
        })).collect::<Vec<_>>()),
        Err(e) => ApiErrorResponse::service_unavailable(e.to_string()),
    }
}

/// `GET /health` — liveness probe, unauthenticated.
pub async fn health() -> Response {
    ApiResponse::ok(serde_json::json!({"status": "ok"}))
}
