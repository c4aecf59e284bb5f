//! Posture dispatcher tick (§4.H): detect → classify → select → render →
//! persist → send, honouring the level-3-preempts-level-2 cooldown priority.

use chrono::{DateTime, Utc};

use crate::classifier;
use crate::cooldown::{posture_channel_for, Channel};
use crate::detection;
use crate::types::{AlertKind, RiskTag, Source, Urgency};

use super::render;
use super::{select_activity, DispatcherContext, DispatcherError};

pub async fn run_posture_tick(ctx: &DispatcherContext, now: DateTime<Utc>) -> Result<(), DispatcherError> {
    let settings = crate::config::get();
    let all_alerts = detection::detect_posture(ctx.gateway.as_ref(), now, &settings.detection).await?;

    for user_alerts in &all_alerts {
        let Some(channel) = posture_channel_for(&user_alerts.alerts) else { continue };

        match channel {
            Channel::PostureL3 => dispatch_recommendation(ctx, &user_alerts.user_id, &user_alerts.alerts, now).await?,
            Channel::PostureL2 => dispatch_informational(ctx, &user_alerts.user_id, &user_alerts.alerts, now).await?,
            Channel::Emotion => unreachable!("posture_channel_for never returns Emotion"),
        }
    }

    Ok(())
}

async fn dispatch_recommendation(ctx: &DispatcherContext, triggered_user_id: &str, alerts: &[AlertKind], now: DateTime<Utc>) -> Result<(), DispatcherError> {
    let risk_tag = classifier::classify(alerts);
    let candidates = crate::catalog::activities(risk_tag);
    let time_ctx = crate::types::TimeContext::from_timestamp(now);

    let (activity, source) = select_activity(&ctx.scorer, triggered_user_id, time_ctx, candidates);
    let urgency = risk_tag.urgency();

    let recommendation = build_recommendation(triggered_user_id, risk_tag, &activity, urgency, source, now);
    ctx.gateway.insert_recommendation(&recommendation).await?;

    let text = render::render_recommendation_message(triggered_user_id, alerts, risk_tag, &activity, urgency);
    let message = super::OutboundMessage { text, recommendation_id: Some(recommendation.id.clone()) };

    send_to_clear_subscribers(ctx, triggered_user_id, Channel::PostureL3, &message, now).await;
    Ok(())
}

async fn dispatch_informational(ctx: &DispatcherContext, triggered_user_id: &str, alerts: &[AlertKind], now: DateTime<Utc>) -> Result<(), DispatcherError> {
    let text = render::render_posture_l2_message(triggered_user_id, alerts);
    let message = super::OutboundMessage { text, recommendation_id: None };
    send_to_clear_subscribers(ctx, triggered_user_id, Channel::PostureL2, &message, now).await;
    Ok(())
}

async fn send_to_clear_subscribers(ctx: &DispatcherContext, triggered_user_id: &str, channel: Channel, message: &super::OutboundMessage, now: DateTime<Utc>) {
    let settings = crate::config::get();
    for subscriber_id in ctx.subscribers.list() {
        let subscriber_key = subscriber_id.to_string();
        if ctx.cooldown.is_active(&subscriber_key, triggered_user_id, channel, now, &settings.cooldown) {
            continue;
        }
        // Send failures do not roll back the cooldown fire (§4.H): we fire
        // unconditionally, then attempt the send.
        ctx.cooldown.fire(&subscriber_key, triggered_user_id, channel, now);
        if let Err(e) = ctx.transport.send(subscriber_id, message).await {
            tracing::warn!(subscriber_id, triggered_user_id, error = %e, "failed to deliver alert message");
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
