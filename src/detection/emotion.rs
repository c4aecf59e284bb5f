//! Acute emotion detection (§4.B "Acute emotion").

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::config::DetectionSettings;
use crate::gateway::RowStoreGateway;
use crate::types::{AlertKind, Emotion, EmotionSample, UserAlerts};

use super::DetectionError;

pub async fn detect_emotion(
    gateway: &dyn RowStoreGateway,
    now: DateTime<Utc>,
    settings: &DetectionSettings,
) -> Result<Vec<UserAlerts>, DetectionError> {
    let since = now - Duration::seconds(settings.emotion_window_secs);
    let rows = gateway.recent_emotions(since, None).await?;

    let mut by_user: HashMap<&str, Vec<&EmotionSample>> = HashMap::new();
    for row in &rows {
        by_user.entry(row.user_id.as_str()).or_default().push(row);
    }

    let mut out: Vec<UserAlerts> = Vec::new();
    let mut user_ids: Vec<&str> = by_user.keys().copied().collect();
    user_ids.sort_unstable();

    for user_id in user_ids {
        let group = &by_user[user_id];
        let mut alerts = Vec::new();

        let negative: Vec<&&EmotionSample> = group.iter().filter(|s| s.emotion.is_negative()).collect();
        if negative.len() >= settings.emotion_negative_group_min {
            let mut per_emotion: HashMap<&'static str, usize> = HashMap::new();
            for s in &negative {
                *per_emotion.entry(s.emotion.label()).or_insert(0) += 1;
            }
            let mut fired_specific = false;
            let mut labels: Vec<&'static str> = per_emotion.keys().copied().collect();
            labels.sort_unstable();
            for label in labels {
                if per_emotion[label] >= settings.emotion_same_count {
                    alerts.push(AlertKind::PersistentEmotion(label));
                    fired_specific = true;
                }
            }
            if !fired_specific
                && negative.len() >= settings.emotion_negative_group_min + settings.emotion_multi_negative_extra
            {
                alerts.push(AlertKind::MultipleNegative);
            }
        }

        let stress_count = group.iter().filter(|s| s.stress_level.is_alto()).count();
        if stress_count >= settings.emotion_stress_count {
            alerts.push(AlertKind::PersistentHighStress);
        }

        if !alerts.is_empty() {
            out.push(UserAlerts { user_id: user_id.to_string(), alerts });
        }
    }

    Ok(out)
}
