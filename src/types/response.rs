//! Response entity (§3 Response) and the reward/label mapping used by training (§4.F).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    Accept,
    Postpone,
    Reject,
}

impl ResponseKind {
    /// `(label, reward)` used to build training samples (§4.F step 1).
    pub fn label_and_reward(&self) -> (usize, f64) {
        match self {
            ResponseKind::Reject => (0, -1.0),
            ResponseKind::Postpone => (1, 0.1),
            ResponseKind::Accept => (2, 1.0),
        }
    }

    /// Gamification delta applied on ingest (§4.I).
    pub fn gamification_delta(&self) -> f64 {
        match self {
            ResponseKind::Accept => 0.2,
            ResponseKind::Postpone => 0.0,
            ResponseKind::Reject => -0.2,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "accept" => Some(ResponseKind::Accept),
            "postpone" => Some(ResponseKind::Postpone),
            "reject" => Some(ResponseKind::Reject),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub recommendation_id: String,
    pub triggered_user_id: String,
    pub response: ResponseKind,
    pub created_at: DateTime<Utc>,
}
