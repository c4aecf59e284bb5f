//! Chronic detection passes (§4.B "Chronic", §4.K).
//!
//! Unlike the acute passes, chronic checks are not windowed by a fixed tick;
//! the caller (the chronic monitor task, [`crate::chronic`]) decides when to
//! run this and owns the per-date suppression set.

use crate::config::DetectionSettings;
use crate::gateway::RowStoreGateway;

use super::DetectionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChronicKind {
    Stress,
    Posture,
}

#[derive(Debug, Clone)]
pub struct ChronicAlert {
    pub user_id: String,
    pub kind: ChronicKind,
    pub message: String,
}

/// Runs both chronic checks for every user in `user_ids`. Per-user gateway
/// errors are logged and skipped, never aborting the whole pass (§7).
pub async fn run_chronic_checks(
    gateway: &dyn RowStoreGateway,
    settings: &DetectionSettings,
    user_ids: &[String],
) -> Result<Vec<ChronicAlert>, DetectionError> {
    let mut out = Vec::new();

    for user_id in user_ids {
        match gateway.stress_scores(user_id, settings.chronic_stress_window_days).await {
            Ok(scores) if scores.len() >= settings.chronic_stress_min_samples => {
                let avg = scores.iter().sum::<f64>() / scores.len() as f64;
                if avg >= settings.chronic_stress_threshold {
                    out.push(ChronicAlert {
                        user_id: user_id.clone(),
                        kind: ChronicKind::Stress,
                        message: format_stress_alert(avg, settings.chronic_stress_threshold),
                    });
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(user_id, error = %e, "chronic stress check failed for user, skipping");
            }
        }

        match gateway
            .high_risk_posture_count(user_id, settings.chronic_posture_window_days)
            .await
        {
            Ok(count) if count >= settings.chronic_posture_threshold => {
                out.push(ChronicAlert {
                    user_id: user_id.clone(),
                    kind: ChronicKind::Posture,
                    message: format_posture_alert(count, settings.chronic_posture_threshold),
                });
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(user_id, error = %e, "chronic posture check failed for user, skipping");
            }
        }
    }

    Ok(out)
}

fn format_stress_alert(avg: f64, threshold: f64) -> String {
    format!(
        "Chronic stress detected: average stress over the window was {avg:.2} (threshold {threshold}). \
         Consider reaching out to a health professional; taking a pause is a sign of strength."
    )
}

fn format_posture_alert(count: u64, threshold: u64) -> String {
    format!(
        "Chronic neck tilt detected: {count} high-risk lateral bend alerts in the window (threshold {threshold}). \
         This pattern is a common indicator of chronic cervical strain — a physiotherapist consult is recommended."
    )
}
