//! Alert Dispatcher (§4.H): the periodic tick loop tying detection,
//! classification, selection, rendering and transport together. Posture and
//! emotion run as two independent tasks staggered to avoid bursts (§4.H);
//! within one domain ticks never overlap (§5).

mod emotion_task;
mod posture_task;
mod render;

pub use emotion_task::run_emotion_tick;
pub use posture_task::run_posture_tick;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::cooldown::CooldownTable;
use crate::detection::DetectionError;
use crate::gateway::{GatewayError, RowStoreGateway};
use crate::model::ThreeClassScorer;
use crate::transport::{NotificationTransport, OutboundMessage, SubscriberStore};
use crate::types::{Activity, Source, TimeContext};

#[derive(Debug, Error)]
pub enum DispatcherError {
    #[error(transparent)]
    Detection(#[from] DetectionError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Everything one dispatcher tick needs, shared across the posture and
/// emotion tasks (§5: the cooldown table is the only cross-domain shared
/// state, protected by its own per-key single-writer discipline).
pub struct DispatcherContext {
    pub gateway: Arc<dyn RowStoreGateway>,
    pub scorer: Arc<ThreeClassScorer>,
    pub cooldown: Arc<CooldownTable>,
    pub transport: Arc<dyn NotificationTransport>,
    pub subscribers: Arc<SubscriberStore>,
}

/// Scores every candidate and picks the best one; falls back to uniform
/// random selection tagged `source=COLD` when the model can't score this
/// user at all (§4.E). Returns an owned [`Activity`] since the catalog's
/// `'static` entries are cheap to clone.
fn select_activity(scorer: &ThreeClassScorer, user_id: &str, ctx: TimeContext, candidates: &'static [Activity]) -> (Activity, Source) {
    if let Some((activity, _score)) = scorer.best_candidate(user_id, ctx, candidates) {
        return (activity.clone(), Source::Ai);
    }
    let idx = crate::model::random_activity_index(candidates.len());
    (candidates[idx].clone(), Source::Cold)
}

/// Runs the posture dispatcher until cancelled, sleeping `tick_interval`
/// between ticks and never starting a new tick before the previous one
/// completes (`MissedTickBehavior::Delay`) (§4.H, §5).
pub async fn run_posture_loop(ctx: Arc<DispatcherContext>, cancel: CancellationToken) {
    run_tick_loop("posture", ctx, cancel, |ctx, now| Box::pin(async move { run_posture_tick(&ctx, now).await })).await;
}

pub async fn run_emotion_loop(ctx: Arc<DispatcherContext>, cancel: CancellationToken) {
    run_tick_loop("emotion", ctx, cancel, |ctx, now| Box::pin(async move { run_emotion_tick(&ctx, now).await })).await;
}

async fn run_tick_loop<F>(domain: &'static str, ctx: Arc<DispatcherContext>, cancel: CancellationToken, tick: F)
where
    F: Fn(Arc<DispatcherContext>, chrono::DateTime<Utc>) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), DispatcherError>> + Send>>,
{
    let tick_interval = Duration::from_secs(crate::config::get().dispatcher.tick_interval_secs);
    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(domain, "dispatcher shutting down");
                break;
            }
            _ = interval.tick() => {
                let now = Utc::now();
                if let Err(e) = tick(ctx.clone(), now).await {
                    tracing::warn!(domain, error = %e, "dispatcher tick failed");
                }
            }
        }
    }
}
