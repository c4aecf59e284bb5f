//! Row Store Gateway (§4.A): typed reads/writes over the external relational
//! store, with error mapping and bounded retry.
//!
//! The store itself is an opaque row service (in production, a hosted
//! Postgres-over-REST store, matching `original_source`'s Supabase usage) —
//! see [`http::HttpRowStoreGateway`] for the concrete transport.

mod error;
mod http;
mod retry;

pub use error::GatewayError;
pub use http::HttpRowStoreGateway;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::{EmotionSample, GamificationEntry, PostureSample, Recommendation, Response};

/// One row of the joined `Response ⋈ Recommendation` history used by the
/// training loop (§4.F step 1).
#[derive(Debug, Clone)]
pub struct TrainingRow {
    pub triggered_user_id: String,
    pub activity_name: String,
    pub response_created_at: DateTime<Utc>,
    pub response: crate::types::ResponseKind,
}

#[derive(Debug, Clone)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub display_name: String,
    pub points: f64,
}

/// The external relational store, reached through typed calls that map
/// transport failures into `{Transient, NotFound, ShapeMismatch}` (§4.A).
#[async_trait]
pub trait RowStoreGateway: Send + Sync {
    async fn recent_posture(&self, since: DateTime<Utc>) -> Result<Vec<PostureSample>, GatewayError>;

    async fn recent_emotions(
        &self,
        since: DateTime<Utc>,
        emotions: Option<&[crate::types::Emotion]>,
    ) -> Result<Vec<EmotionSample>, GatewayError>;

    async fn insert_recommendation(&self, rec: &Recommendation) -> Result<(), GatewayError>;

    async fn insert_response(&self, resp: &Response) -> Result<(), GatewayError>;

    async fn gamification_get(&self, user_id: &str) -> Result<Option<GamificationEntry>, GatewayError>;

    async fn gamification_upsert(&self, user_id: &str, points: f64) -> Result<(), GatewayError>;

    async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, GatewayError>;

    async fn history_for_training(&self) -> Result<Vec<TrainingRow>, GatewayError>;

    /// Numeric stress scores over the last `days`, for the chronic stress check (§4.B, §4.K).
    async fn stress_scores(&self, user_id: &str, days: i64) -> Result<Vec<f64>, GatewayError>;

    /// Count of `neck_lateral_bend>=3` posture rows over the last `days` (§4.B, §4.K).
    async fn high_risk_posture_count(&self, user_id: &str, days: i64) -> Result<u64, GatewayError>;

    /// Distinct user ids observed anywhere in posture/emotion history, used to
    /// drive the chronic monitor's per-user sweep.
    async fn known_user_ids(&self) -> Result<Vec<String>, GatewayError>;
}
