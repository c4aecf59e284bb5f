//! Response Ingest (§4.I): records subscriber feedback and updates the
//! gamification ledger. Write failures never credit gamification — callers
//! see a soft failure and may retry (§7).

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::gamification;
use crate::gateway::{GatewayError, RowStoreGateway};
use crate::types::{parse_triggered_user, Response, ResponseKind};

#[derive(Debug, Error)]
pub enum IngestError {
    /// Unrecognised response verb — not `accept`/`postpone`/`reject`.
    #[error("unknown response verb: {0}")]
    UnknownVerb(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub triggered_user_id: String,
    /// Whether the recommendation id failed to parse and fell back to the
    /// default user id (§4.I, §9 open question 2) — callers should surface
    /// this via a warning metric.
    pub fell_back: bool,
    pub new_points: f64,
}

/// Ingests one `(recommendation_id, subscriber_id, response, timestamp)`
/// callback. Duplicates are accepted by design and each re-credits
/// gamification (§4.I, §9 open question 1) — no dedup is attempted here.
pub async fn ingest_response(
    gateway: &dyn RowStoreGateway,
    recommendation_id: &str,
    subscriber_id: &str,
    response_str: &str,
    now: DateTime<Utc>,
) -> Result<IngestOutcome, IngestError> {
    let response = ResponseKind::from_str(response_str).ok_or_else(|| IngestError::UnknownVerb(response_str.to_string()))?;

    let (triggered_user_id, parsed_ok) = parse_triggered_user(recommendation_id);
    if !parsed_ok {
        tracing::warn!(recommendation_id, subscriber_id, "malformed recommendation id, attributing feedback to fallback user");
    }

    let row = Response {
        recommendation_id: recommendation_id.to_string(),
        triggered_user_id: triggered_user_id.clone(),
        response,
        created_at: now,
    };
    gateway.insert_response(&row).await?;

    let new_points = gamification::apply(gateway, &triggered_user_id, response.gamification_delta()).await?;

    Ok(IngestOutcome { triggered_user_id, fell_back: !parsed_ok, new_points })
}

impl From<gamification::GamificationError> for IngestError {
    fn from(e: gamification::GamificationError) -> Self {
        match e {
            gamification::GamificationError::Gateway(g) => IngestError::Gateway(g),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::gateway::{LeaderboardEntry, TrainingRow};
    use crate::types::{EmotionSample, GamificationEntry, PostureSample, Recommendation};

    struct FakeGateway {
        responses: Mutex<Vec<Response>>,
        points: Mutex<Option<f64>>,
    }

    #[async_trait]
    impl RowStoreGateway for FakeGateway {
        async fn recent_posture(&self, _since: DateTime<Utc>) -> Result<Vec<PostureSample>, GatewayError> { Ok(vec![]) }
        async fn recent_emotions(&self, _since: DateTime<Utc>, _emotions: Option<&[crate::types::Emotion]>) -> Result<Vec<EmotionSample>, GatewayError> { Ok(vec![]) }
        async fn insert_recommendation(&self, _rec: &Recommendation) -> Result<(), GatewayError> { Ok(()) }
        async fn insert_response(&self, resp: &Response) -> Result<(), GatewayError> {
            self.responses.lock().unwrap().push(resp.clone());
            Ok(())
        }
        async fn gamification_get(&self, _user_id: &str) -> Result<Option<GamificationEntry>, GatewayError> {
            Ok(self.points.lock().unwrap().map(|p| GamificationEntry { user_id: "7".into(), points: p, last_updated: Utc::now() }))
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
    async fn well_formed_id_extracts_triggered_user() {
        let gateway = FakeGateway { responses: Mutex::new(vec![]), points: Mutex::new(Some(10.0)) };
        let outcome = ingest_response(&gateway, "rec_7_20260101120000_1234", "100", "accept", Utc::now()).await.unwrap();
        assert_eq!(outcome.triggered_user_id, "7");
        assert!(!outcome.fell_back);
        assert_eq!(outcome.new_points, 10.0);
    }

    #[tokio::test]
    async fn malformed_id_falls_back_and_is_flagged() {
        let gateway = FakeGateway { responses: Mutex::new(vec![]), points: Mutex::new(None) };
        let outcome = ingest_response(&gateway, "garbage", "100", "reject", Utc::now()).await.unwrap();
        assert_eq!(outcome.triggered_user_id, "1");
        assert!(outcome.fell_back);
    }

    #[tokio::test]
    async fn unknown_verb_is_rejected() {
        let gateway = FakeGateway { responses: Mutex::new(vec![]), points: Mutex::new(None) };
        let err = ingest_response(&gateway, "rec_7_20260101120000_1234", "100", "snooze", Utc::now()).await.unwrap_err();
        assert!(matches!(err, IngestError::UnknownVerb(_)));
    }

    #[tokio::test]
    async fn duplicate_responses_each_recredit_gamification() {
        let gateway = FakeGateway { responses: Mutex::new(vec![]), points: Mutex::new(Some(9.8)) };
        ingest_response(&gateway, "rec_7_20260101120000_1234", "100", "accept", Utc::now()).await.unwrap();
        let second = ingest_response(&gateway, "rec_7_20260101120000_1234", "100", "accept", Utc::now()).await.unwrap();
        assert_eq!(second.new_points, 10.0);
        assert_eq!(gateway.responses.lock().unwrap().len(), 2);
    }
}
