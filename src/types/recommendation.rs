//! Recommendation entity (§3 Recommendation) and id grammar (§6).

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::ActivityType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Medium,
    High,
}

/// Provenance of a recommendation's activity choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    /// Chosen by the trained personalisation model.
    Ai,
    /// Model untrained or user unseen — chosen uniformly at random.
    Cold,
    /// Reserved for a pure rules fallback with no candidates to rank.
    Rules,
}

/// A recommendation produced for a triggered user. Immutable once inserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub risk_tag: String,
    pub triggered_user_id: String,
    pub activity_name: String,
    pub activity_type: ActivityType,
    pub steps: Vec<String>,
    pub duration: String,
    pub urgency: Urgency,
    pub source: Source,
    pub created_at: DateTime<Utc>,
}

/// Builds a recommendation id `rec_<user>_<YYYYMMDDHHMMSS>_<4-digit random>` (§6).
pub fn new_recommendation_id(triggered_user_id: &str, now: DateTime<Utc>) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(1000..10000);
    format!(
        "rec_{}_{}_{}",
        triggered_user_id,
        now.format("%Y%m%d%H%M%S"),
        suffix
    )
}

/// Parses a recommendation id into its triggered-user component.
///
/// Splits on `_` and takes the second field. Malformed ids fall back to
/// user `1` per the documented open question (§9.2) — callers are expected
/// to log a warning when this falls back.
pub fn parse_triggered_user(rec_id: &str) -> (String, bool) {
    let parts: Vec<&str> = rec_id.split('_').collect();
    match parts.get(1) {
        Some(user) if !user.is_empty() => (user.to_string(), true),
        _ => ("1".to_string(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_grammar_round_trips() {
        let now = Utc::now();
        let id = new_recommendation_id("42", now);
        assert!(id.starts_with("rec_42_"));
        let (user, ok) = parse_triggered_user(&id);
        assert_eq!(user, "42");
        assert!(ok);
    }

    #[test]
    fn malformed_id_falls_back_to_user_one() {
        let (user, ok) = parse_triggered_user("garbage");
        assert_eq!(user, "1");
        assert!(!ok);
    }

    #[test]
    fn empty_user_field_falls_back() {
        let (user, ok) = parse_triggered_user("rec__20240101000000_1234");
        assert_eq!(user, "1");
        assert!(!ok);
    }
}
