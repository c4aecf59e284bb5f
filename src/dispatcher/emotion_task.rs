//! Emotion dispatcher tick (§4.H): same detect → classify → select → render
//! → persist → send pipeline as posture, keyed on the single `Emotion` channel.

use chrono::{DateTime, Utc};

use crate::classifier;
use crate::cooldown::Channel;
use crate::detection;
use crate::types::{RiskTag, Source, Urgency};

use super::render;
use super::{select_activity, DispatcherContext, DispatcherError};

pub async fn run_emotion_tick(ctx: &DispatcherContext, now: DateTime<Utc>) -> Result<(), DispatcherError> {
    let settings = crate::config::get();
    let all_alerts = detection::detect_emotion(ctx.gateway.as_ref(), now, &settings.detection).await?;

    for user_alerts in &all_alerts {
        if user_alerts.alerts.is_empty() {
            continue;
        }

        let risk_tag = classifier::classify(&user_alerts.alerts);
        let candidates = crate::catalog::activities(risk_tag);
        let time_ctx = crate::types::TimeContext::from_timestamp(now);

        let (activity, source) = select_activity(&ctx.scorer, &user_alerts.user_id, time_ctx, candidates);
        let urgency = risk_tag.urgency();

        let recommendation = build_recommendation(&user_alerts.user_id, risk_tag, &activity, urgency, source, now);
        ctx.gateway.insert_recommendation(&recommendation).await?;

        let text = render::render_recommendation_message(&user_alerts.user_id, &user_alerts.alerts, risk_tag, &activity, urgency);
        let message = super::OutboundMessage { text, recommendation_id: Some(recommendation.id.clone()) };

        send_to_clear_subscribers(ctx, &user_alerts.user_id, &message, now).await;
    }

    Ok(())
}

async fn send_to_clear_subscribers(ctx: &DispatcherContext, triggered_user_id: &str, message: &super::OutboundMessage, now: DateTime<Utc>) {
    let settings = crate::config::get();
    for subscriber_id in ctx.subscribers.list() {
        let subscriber_key = subscriber_id.to_string();
        if ctx.cooldown.is_active(&subscriber_key, triggered_user_id, Channel::Emotion, now, &settings.cooldown) {
            continue;
        }
        ctx.cooldown.fire(&subscriber_key, triggered_user_id, Channel::Emotion, now);
        if let Err(e) = ctx.transport.send(subscriber_id, message).await {
            tracing::warn!(subscriber_id, triggered_user_id, error = %e, "failed to deliver emotion alert message");
        }
    }
}

fn build_recommendation(
    triggered_user_id: &str,
    risk_tag: RiskTag,
    activity: &crate::types::Activity,
    urgency: Urgency,
    source: Source,
    now: DateTime<Utc>,
) -> crate::types::Recommendation {
    crate::types::Recommendation {
        id: crate::types::new_recommendation_id(triggered_user_id, now),
        risk_tag: risk_tag.as_str().to_string(),
        triggered_user_id: triggered_user_id.to_string(),
        activity_name: activity.name.to_string(),
        activity_type: activity.activity_type,
        steps: activity.steps.iter().map(|s| s.to_string()).collect(),
        duration: activity.duration.to_string(),
        urgency,
        source,
        created_at: now,
    }
}
