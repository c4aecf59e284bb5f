//! Acute posture detection (§4.B "Acute posture").

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::config::DetectionSettings;
use crate::gateway::RowStoreGateway;
use crate::types::{AlertKind, PostureRegion, PostureSample, UserAlerts};

use super::DetectionError;

/// Runs the coarse overall-zone pass and the finer per-region pass, merging
/// results per triggered user. Users are returned in ascending id order,
/// matching the dispatcher's ordering requirement (§4.H).
pub async fn detect_posture(
    gateway: &dyn RowStoreGateway,
    now: DateTime<Utc>,
    settings: &DetectionSettings,
) -> Result<Vec<UserAlerts>, DetectionError> {
    let region_window = settings.posture_region_window_secs.max(settings.posture_window_secs);
    let since = now - Duration::seconds(region_window);
    let rows = gateway.recent_posture(since).await?;

    let posture_cutoff = now - Duration::seconds(settings.posture_window_secs);

    let mut by_user: HashMap<&str, Vec<&PostureSample>> = HashMap::new();
    for row in &rows {
        by_user.entry(row.user_id.as_str()).or_default().push(row);
    }

    let mut out: Vec<UserAlerts> = Vec::new();
    let mut user_ids: Vec<&str> = by_user.keys().copied().collect();
    user_ids.sort_unstable();

    for user_id in user_ids {
        let group = &by_user[user_id];
        let mut alerts = Vec::new();

        let coarse: Vec<&&PostureSample> = group.iter().filter(|s| s.timestamp >= posture_cutoff).collect();

        let critical_count = coarse.iter().filter(|s| s.overall_zone >= 4).count();
        let high_count = coarse.iter().filter(|s| s.overall_zone >= 3).count();
        let medium_count = coarse.iter().filter(|s| s.overall_zone >= 2).count();

        if critical_count >= settings.posture_critical_count {
            alerts.push(AlertKind::CriticalPosture);
        } else if high_count >= settings.posture_high_count {
            alerts.push(AlertKind::HighPosture);
        } else if medium_count >= settings.posture_medium_count {
            alerts.push(AlertKind::MediumPosture);
        }

        for region in PostureRegion::ALL {
            let zone2_count = group.iter().filter(|s| s.region(region) == 2).count();
            let zone3_plus_count = group.iter().filter(|s| s.region(region) >= 3).count();

            if zone3_plus_count >= settings.posture_region_count {
                alerts.push(AlertKind::RegionAlert { region, level3_plus: true });
            } else if zone2_count >= settings.posture_region_count {
                alerts.push(AlertKind::RegionAlert { region, level3_plus: false });
            }
        }

        if !alerts.is_empty() {
            out.push(UserAlerts { user_id: user_id.to_string(), alerts });
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::gateway::GatewayError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeGateway {
        rows: Mutex<Vec<PostureSample>>,
    }

    #[async_trait]
    impl RowStoreGateway for FakeGateway {
        async fn recent_posture(&self, _since: DateTime<Utc>) -> Result<Vec<PostureSample>, GatewayError> {
            Ok(self.rows.lock().unwrap().clone())
        }
        async fn recent_emotions(
            &self,
            _since: DateTime<Utc>,
            _emotions: Option<&[crate::types::Emotion]>,
        ) -> Result<Vec<crate::types::EmotionSample>, GatewayError> {
            Ok(vec![])
        }
        async fn insert_recommendation(&self, _: &crate::types::Recommendation) -> Result<(), GatewayError> { Ok(()) }
        async fn insert_response(&self, _: &crate::types::Response) -> Result<(), GatewayError> { Ok(()) }
        async fn gamification_get(&self, _: &str) -> Result<Option<crate::types::GamificationEntry>, GatewayError> { Ok(None) }
        async fn gamification_upsert(&self, _: &str, _: f64) -> Result<(), GatewayError> { Ok(()) }
        async fn leaderboard(&self) -> Result<Vec<crate::gateway::LeaderboardEntry>, GatewayError> { Ok(vec![]) }
        async fn history_for_training(&self) -> Result<Vec<crate::gateway::TrainingRow>, GatewayError> { Ok(vec![]) }
        async fn stress_scores(&self, _: &str, _: i64) -> Result<Vec<f64>, GatewayError> { Ok(vec![]) }
        async fn high_risk_posture_count(&self, _: &str, _: i64) -> Result<u64, GatewayError> { Ok(0) }
        async fn known_user_ids(&self) -> Result<Vec<String>, GatewayError> { Ok(vec![]) }
    }

    fn sample(user: &str, zone: i8, ts: DateTime<Utc>) -> PostureSample {
        PostureSample {
            user_id: user.to_string(),
            timestamp: ts,
            overall_zone: zone,
            neck_flexion: -1,
            neck_lateral_bend: -1,
            shoulder_alignment: -1,
            arm_abduction: -1,
        }
    }

    #[tokio::test]
    async fn four_critical_rows_emit_critical() {
        let now = Utc::now();
        let rows = (0..4).map(|_| sample("7", 4, now)).collect();
        let gw = FakeGateway { rows: Mutex::new(rows) };
        let settings = Settings::default().detection;
        let result = detect_posture(&gw, now, &settings).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].user_id, "7");
        assert_eq!(result[0].alerts[0], AlertKind::CriticalPosture);
    }

    #[tokio::test]
    async fn boundary_high_count_minus_one_does_not_fire() {
        let now = Utc::now();
        let rows = (0..4).map(|_| sample("5", 3, now)).collect();
        let gw = FakeGateway { rows: Mutex::new(rows) };
        let settings = Settings::default().detection;
        let result = detect_posture(&gw, now, &settings).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn boundary_high_count_exact_fires() {
        let now = Utc::now();
        let rows = (0..5).map(|_| sample("5", 3, now)).collect();
        let gw = FakeGateway { rows: Mutex::new(rows) };
        let settings = Settings::default().detection;
        let result = detect_posture(&gw, now, &settings).await.unwrap();
        assert_eq!(result[0].alerts[0], AlertKind::HighPosture);
    }

    #[tokio::test]
    async fn rows_outside_coarse_window_are_excluded() {
        let now = Utc::now();
        let old = now - Duration::seconds(15);
        let rows = (0..4).map(|_| sample("7", 4, old)).collect();
        let gw = FakeGateway { rows: Mutex::new(rows) };
        let settings = Settings::default().detection;
        let result = detect_posture(&gw, now, &settings).await.unwrap();
        assert!(result.is_empty());
    }
}
