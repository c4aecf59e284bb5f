//! Chronic Monitor task (§4.K): runs the chronic detection pass at most once
//! per local date, remembering fired `(user, kind)` pairs to suppress repeats
//! until the date changes.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tokio_util::sync::CancellationToken;

use crate::detection::{run_chronic_checks, ChronicAlert, ChronicKind, DetectionError};
use crate::gateway::RowStoreGateway;
use crate::transport::{NotificationTransport, OutboundMessage, SubscriberStore};

/// How often the loop wakes to check whether the local date has rolled over.
/// The check itself is cheap; this just bounds delivery latency after midnight.
const POLL_INTERVAL_SECS: u64 = 300;

pub struct ChronicMonitor {
    fired_today: Mutex<HashSet<(String, ChronicKindKey)>>,
    last_date: Mutex<Option<NaiveDate>>,
}

/// `ChronicKind` has no `Hash`/`Eq`; mirror it locally for the suppression set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ChronicKindKey {
    Stress,
    Posture,
}

impl From<ChronicKind> for ChronicKindKey {
    fn from(k: ChronicKind) -> Self {
        match k {
            ChronicKind::Stress => ChronicKindKey::Stress,
            ChronicKind::Posture => ChronicKindKey::Posture,
        }
    }
}

impl ChronicMonitor {
    pub fn new() -> Self {
        Self { fired_today: Mutex::new(HashSet::new()), last_date: Mutex::new(None) }
    }

    /// Runs the chronic pass once, returning only alerts not already fired
    /// today. Clears the suppression set on a date change (§4.K).
    pub async fn run_once(&self, gateway: &dyn RowStoreGateway, settings: &crate::config::DetectionSettings, user_ids: &[String], now: DateTime<Utc>) -> Result<Vec<ChronicAlert>, DetectionError> {
        let today = now.date_naive();
        {
            let mut last_date = self.last_date.lock().unwrap();
            if *last_date != Some(today) {
                self.fired_today.lock().unwrap().clear();
                *last_date = Some(today);
            }
        }

        let alerts = run_chronic_checks(gateway, settings, user_ids).await?;

        let mut fired = self.fired_today.lock().unwrap();
        let fresh: Vec<ChronicAlert> = alerts
            .into_iter()
            .filter(|alert| fired.insert((alert.user_id.clone(), alert.kind.into())))
            .collect();

        Ok(fresh)
    }
}

impl Default for ChronicMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Broadcasts every fresh chronic alert to all current subscribers; there is
/// no per-message cooldown for the chronic channel, only the per-date
/// suppression owned by [`ChronicMonitor`].
pub async fn broadcast_chronic_alerts(transport: &dyn NotificationTransport, subscribers: &SubscriberStore, alerts: &[ChronicAlert]) {
    for alert in alerts {
        let message = OutboundMessage { text: alert.message.clone(), recommendation_id: None };
        for subscriber_id in subscribers.list() {
            if let Err(e) = transport.send(subscriber_id, &message).await {
                tracing::warn!(subscriber_id, user_id = %alert.user_id, error = %e, "failed to deliver chronic alert");
            }
        }
    }
}

/// Runs the chronic monitor until cancelled, polling every
/// [`POLL_INTERVAL_SECS`] and letting [`ChronicMonitor::run_once`] decide
/// whether a new local date has actually started (§4.K, §5).
pub async fn run_chronic_loop(
    monitor: Arc<ChronicMonitor>,
    gateway: Arc<dyn RowStoreGateway>,
    transport: Arc<dyn NotificationTransport>,
    subscribers: Arc<SubscriberStore>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(POLL_INTERVAL_SECS));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("chronic monitor shutting down");
                break;
            }
            _ = interval.tick() => {
                let settings = crate::config::get();
                let now = Utc::now();
                let user_ids = match gateway.known_user_ids().await {
                    Ok(ids) => ids,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to list known users for chronic monitor, skipping this pass");
                        continue;
                    }
                };

                match monitor.run_once(gateway.as_ref(), &settings.detection, &user_ids, now).await {
                    Ok(alerts) if !alerts.is_empty() => {
                        broadcast_chronic_alerts(transport.as_ref(), &subscribers, &alerts).await;
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "chronic detection pass failed"),
                }
            }
        }
    }
}
