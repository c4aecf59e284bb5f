//! Gamification ledger entry (§3 GamificationEntry, §4.J).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Floor/ceiling for clamped points (§4.J).
pub const POINTS_MIN: f64 = 0.0;
pub const POINTS_MAX: f64 = 10.0;
/// Points assigned to a user's first observation, before any delta (§3, §8.3).
pub const POINTS_INITIAL: f64 = 10.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamificationEntry {
    pub user_id: String,
    pub points: f64,
    pub last_updated: DateTime<Utc>,
}

/// Applies the clamp rule: create at `POINTS_INITIAL` then apply delta if no
/// entry exists; otherwise `clamp(old + delta, POINTS_MIN, POINTS_MAX)` (§4.J).
pub fn apply_delta(existing: Option<f64>, delta: f64) -> f64 {
    let base = existing.unwrap_or(POINTS_INITIAL);
    (base + delta).clamp(POINTS_MIN, POINTS_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_initialises_then_applies_delta() {
        assert_eq!(apply_delta(None, 0.2), 10.0);
        assert_eq!(apply_delta(None, -0.2), 9.8);
    }

    #[test]
    fn clamps_at_ceiling() {
        assert_eq!(apply_delta(Some(9.9), 0.2), 10.0);
    }

    #[test]
    fn clamps_at_floor() {
        assert_eq!(apply_delta(Some(0.05), -0.2), 0.0);
    }
}
