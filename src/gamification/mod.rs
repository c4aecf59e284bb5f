//! Gamification Ledger (§4.J): a clamped additive score per user, serialised
//! through the gateway (the store row is the single source of truth — there
//! is no local cache to keep consistent).

use thiserror::Error;

use crate::gateway::{GatewayError, LeaderboardEntry, RowStoreGateway};
use crate::types::apply_delta;

#[derive(Debug, Error)]
pub enum GamificationError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Applies `delta` to `user_id`'s points, reading the current value from the
/// gateway first so last-writer-wins is scoped to a single round trip (§4.J).
/// Returns the new clamped point value.
pub async fn apply(gateway: &dyn RowStoreGateway, user_id: &str, delta: f64) -> Result<f64, GamificationError> {
    let existing = gateway.gamification_get(user_id).await?.map(|e| e.points);
    let new_points = apply_delta(existing, delta);
    gateway.gamification_upsert(user_id, new_points).await?;
    Ok(new_points)
}

/// The leaderboard snapshot, ordered descending by points (§4.J) — ordering
/// is the gateway's responsibility; this just forwards the call.
pub async fn leaderboard(gateway: &dyn RowStoreGateway) -> Result<Vec<LeaderboardEntry>, GamificationError> {
    Ok(gateway.leaderboard().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;

    use crate::types::{EmotionSample, GamificationEntry, PostureSample, Recommendation, Response, ResponseKind};
    use crate::gateway::TrainingRow;

    struct FakeGateway {
        points: Mutex<Option<f64>>,
    }

    #[async_trait]
    impl RowStoreGateway for FakeGateway {
        async fn recent_posture(&self, _since: DateTime<Utc>) -> Result<Vec<PostureSample>, GatewayError> { Ok(vec![]) }
        async fn recent_emotions(&self, _since: DateTime<Utc>, _emotions: Option<&[crate::types::Emotion]>) -> Result<Vec<EmotionSample>, GatewayError> { Ok(vec![]) }
        async fn insert_recommendation(&self, _rec: &Recommendation) -> Result<(), GatewayError> { Ok(()) }
        async fn insert_response(&self, _resp: &Response) -> Result<(), GatewayError> { Ok(()) }
        async fn gamification_get(&self, _user_id: &str) -> Result<Option<GamificationEntry>, GatewayError> {
            Ok(self.points.lock().unwrap().map(|p| GamificationEntry { user_id: "2".into(), points: p, last_updated: Utc::now() }))
        }
        async fn gamification_upsert(&self, _user_id: &str, points: f64) -> Result<(), GatewayError> {
            *self.points.lock().unwrap() = Some(points);
            Ok(())
        }
        async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, GatewayError> { Ok(vec![]) }
        async fn history_for_training(&self) -> Result<Vec<TrainingRow>, GatewayError> { Ok(vec![]) }
        async fn stress_scores(&self, _user_id: &str, _days: i64) -> Result<Vec<f64>, GatewayError> { Ok(vec![]) }
        async fn high_risk_posture_count(&self, _user_id: &str, _days: i64) -> Result<u64, GatewayError> { Ok(0) }
        async fn known_user_ids(&self) -> Result<Vec<String>, GatewayError> { Ok(vec![]) }
    }

    #[tokio::test]
    async fn clamp_at_ceiling_after_three_accepts() {
        let gateway = FakeGateway { points: Mutex::new(Some(9.9)) };
        let mut last = 0.0;
        for _ in 0..3 {
            last = apply(&gateway, "2", ResponseKind::Accept.gamification_delta()).await.unwrap();
        }
        assert_eq!(last, 10.0);
    }

    #[tokio::test]
    async fn first_observation_initialises_before_delta() {
        let gateway = FakeGateway { points: Mutex::new(None) };
        let points = apply(&gateway, "new-user", ResponseKind::Reject.gamification_delta()).await.unwrap();
        assert_eq!(points, 9.8);
    }
}
