//! Emotion sample types (§3 EmotionSample).
//!
//! `stress_level` is intentionally kept in two forms per design note 9.3:
//! the bucketed string drives the acute detection path (which filters on
//! `"alto"`), the numeric `stress_score` drives the chronic average.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Angry,
    Fear,
    Disgust,
    Sad,
    Neutral,
    Happy,
    Surprise,
    Unknown,
}

impl Emotion {
    pub fn is_negative(&self) -> bool {
        matches!(self, Emotion::Sad | Emotion::Fear | Emotion::Angry | Emotion::Disgust)
    }

    /// Human label used by the risk classifier (§4.C "any negative-emotion term").
    pub fn label(&self) -> &'static str {
        match self {
            Emotion::Angry => "angry",
            Emotion::Fear => "fear",
            Emotion::Disgust => "disgust",
            Emotion::Sad => "sad",
            Emotion::Neutral => "neutral",
            Emotion::Happy => "happy",
            Emotion::Surprise => "surprise",
            Emotion::Unknown => "unknown",
        }
    }
}

/// The bucketed stress level as written by the vision client, `muy bajo..muy alto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressLevel {
    MuyBajo,
    Bajo,
    Medio,
    Alto,
    MuyAlto,
}

impl StressLevel {
    pub fn is_alto(&self) -> bool {
        matches!(self, StressLevel::Alto)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionSample {
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub emotion: Emotion,
    pub stress_level: StressLevel,
    /// Numeric stress score in `[0, 100]`, driving the chronic-average check.
    pub stress_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_set_matches_spec() {
        assert!(Emotion::Sad.is_negative());
        assert!(Emotion::Fear.is_negative());
        assert!(Emotion::Angry.is_negative());
        assert!(Emotion::Disgust.is_negative());
        assert!(!Emotion::Neutral.is_negative());
        assert!(!Emotion::Happy.is_negative());
    }
}
