//! Subscriber command surface (§6): the text commands a subscriber can issue
//! out-of-band from the alert stream. The concrete chat transport is an
//! external collaborator (§1); this module only computes the response text,
//! so any transport can drive it.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::cooldown::{Channel, CooldownTable};
use crate::detection::{self, DetectionError};
use crate::gateway::{GatewayError, RowStoreGateway};
use crate::model::ThreeClassScorer;
use crate::transport::SubscriberStore;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Detection(#[from] DetectionError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

pub struct CommandContext<'a> {
    pub gateway: &'a dyn RowStoreGateway,
    pub scorer: &'a ThreeClassScorer,
    pub cooldown: &'a CooldownTable,
    pub subscribers: &'a SubscriberStore,
}

/// `start`: registers `subscriber_id`, persisting the set immediately (§6).
pub fn start(ctx: &CommandContext, subscriber_id: i64) -> Result<String, crate::transport::SubscriberError> {
    let added = ctx.subscribers.add(subscriber_id)?;
    Ok(if added {
        "You're subscribed to well-being alerts.".to_string()
    } else {
        "You're already subscribed.".to_string()
    })
}

/// `status`: posture + emotion summary for the current window.
pub async fn status(ctx: &CommandContext<'_>, now: DateTime<Utc>) -> Result<String, CommandError> {
    let posture = posture_status(ctx, now).await?;
    let emotion = emotion_status(ctx, now).await?;
    Ok(format!("{posture}\n\n{emotion}"))
}

pub async fn posture_status(ctx: &CommandContext<'_>, now: DateTime<Utc>) -> Result<String, CommandError> {
    let settings = crate::config::get();
    let alerts = detection::detect_posture(ctx.gateway, now, &settings.detection).await?;
    Ok(summarize("Posture", &alerts))
}

pub async fn emotion_status(ctx: &CommandContext<'_>, now: DateTime<Utc>) -> Result<String, CommandError> {
    let settings = crate::config::get();
    let alerts = detection::detect_emotion(ctx.gateway, now, &settings.detection).await?;
    Ok(summarize("Emotion", &alerts))
}

fn summarize(domain: &str, alerts: &[crate::types::UserAlerts]) -> String {
    if alerts.is_empty() {
        return format!("{domain}: no active alerts in the current window.");
    }
    let mut lines = vec![format!("{domain} alerts:")];
    for user_alerts in alerts {
        lines.push(format!("- user {}: {} alert(s)", user_alerts.user_id, user_alerts.alerts.len()));
    }
    lines.join("\n")
}

/// `recommendation <user_id>`: forces a one-off recommendation, respecting
/// cooldown (§6) — a cooldown-blocked request never bypasses `posture_l3`.
pub async fn force_recommendation(ctx: &CommandContext<'_>, subscriber_id: &str, triggered_user_id: &str, now: DateTime<Utc>) -> Result<String, CommandError> {
    let settings = crate::config::get();
    if ctx.cooldown.is_active(subscriber_id, triggered_user_id, Channel::PostureL3, now, &settings.cooldown) {
        let remaining = settings.cooldown.posture_l3_secs;
        return Ok(format!("active cooldown, retry in {remaining}s"));
    }

    let candidates = crate::catalog::activities(crate::types::RiskTag::GeneralPosture);
    let time_ctx = crate::types::TimeContext::from_timestamp(now);
    let (activity, source) = match ctx.scorer.best_candidate(triggered_user_id, time_ctx, candidates) {
        Some((a, _)) => (a.clone(), crate::types::Source::Ai),
        None => {
            let idx = crate::model::random_activity_index(candidates.len());
            (candidates[idx].clone(), crate::types::Source::Cold)
        }
    };

    let recommendation = crate::types::Recommendation {
        id: crate::types::new_recommendation_id(triggered_user_id, now),
        risk_tag: crate::types::RiskTag::GeneralPosture.as_str().to_string(),
        triggered_user_id: triggered_user_id.to_string(),
        activity_name: activity.name.to_string(),
        activity_type: activity.activity_type,
        steps: activity.steps.iter().map(|s| s.to_string()).collect(),
        duration: activity.duration.to_string(),
        urgency: crate::types::RiskTag::GeneralPosture.urgency(),
        source,
        created_at: now,
    };
    ctx.gateway.insert_recommendation(&recommendation).await?;
    ctx.cooldown.fire(subscriber_id, triggered_user_id, Channel::PostureL3, now);

    Ok(format!("Sent a one-off recommendation for user {triggered_user_id}: {}", activity.name))
}

/// `stats <user_id>`: last-30-day accept/postpone/reject counts and acceptance rate.
pub async fn stats(ctx: &CommandContext<'_>, user_id: &str) -> Result<String, CommandError> {
    let history = ctx.gateway.history_for_training().await?;
    let cutoff = Utc::now() - chrono::Duration::days(30);

    let (mut accept, mut postpone, mut reject) = (0u32, 0u32, 0u32);
    for row in &history {
        if row.triggered_user_id != user_id || row.response_created_at < cutoff {
            continue;
        }
        match row.response {
            crate::types::ResponseKind::Accept => accept += 1,
            crate::types::ResponseKind::Postpone => postpone += 1,
            crate::types::ResponseKind::Reject => reject += 1,
        }
    }

    let total = accept + postpone + reject;
    let rate = if total == 0 { 0.0 } else { f64::from(accept) / f64::from(total) * 100.0 };

    Ok(format!(
        "Last 30 days for user {user_id}: accept={accept} postpone={postpone} reject={reject} (acceptance rate {rate:.1}%)"
    ))
}

/// `config`: dumps current thresholds and cooldowns.
pub fn config_dump() -> String {
    let settings = crate::config::get();
    format!(
        "posture: crit>={} high>={} med>={} region>={}\nemotion: neg_group>={} same>={} multi_extra>={} stress>={}\ncooldowns: l3={}s l2={}s emotion={}s",
        settings.detection.posture_critical_count,
        settings.detection.posture_high_count,
        settings.detection.posture_medium_count,
        settings.detection.posture_region_count,
        settings.detection.emotion_negative_group_min,
        settings.detection.emotion_same_count,
        settings.detection.emotion_multi_negative_extra,
        settings.detection.emotion_stress_count,
        settings.cooldown.posture_l3_secs,
        settings.cooldown.posture_l2_secs,
        settings.cooldown.emotion_secs,
    )
}

/// `model_status`: readiness, user-index size, activity-index size.
pub fn model_status(scorer: &ThreeClassScorer) -> String {
    if scorer.is_ready() {
        "model: ready".to_string()
    } else {
        "model: not trained yet, serving via Cold fallback".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_dump_mentions_defaults() {
        if !crate::config::is_initialized() {
            crate::config::init(crate::config::Settings::default());
        }
        let dump = config_dump();
        assert!(dump.contains("crit>=4"));
        assert!(dump.contains("l3=30s"));
    }

    #[test]
    fn model_status_reports_not_ready_before_training() {
        let scorer = ThreeClassScorer::new();
        assert!(model_status(&scorer).contains("not trained"));
    }
}
