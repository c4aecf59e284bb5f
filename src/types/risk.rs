//! Risk tag enum (§4.C), keying both the catalog (§4.D) and the activity index (§4.F).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTag {
    CriticalPosture,
    GeneralPosture,
    NeckFlexion,
    ShoulderAlignment,
    StressHigh,
    NegativeEmotion,
}

impl RiskTag {
    pub const ALL: [RiskTag; 6] = [
        RiskTag::CriticalPosture,
        RiskTag::GeneralPosture,
        RiskTag::NeckFlexion,
        RiskTag::ShoulderAlignment,
        RiskTag::StressHigh,
        RiskTag::NegativeEmotion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTag::CriticalPosture => "critical_posture",
            RiskTag::GeneralPosture => "general_posture",
            RiskTag::NeckFlexion => "neck_flexion",
            RiskTag::ShoulderAlignment => "shoulder_alignment",
            RiskTag::StressHigh => "stress_high",
            RiskTag::NegativeEmotion => "negative_emotion",
        }
    }

    /// `high` for any tag containing "critical", `medium` otherwise.
    pub fn urgency(&self) -> super::Urgency {
        if self.as_str().contains("critical") {
            super::Urgency::High
        } else {
            super::Urgency::Medium
        }
    }
}

impl std::fmt::Display for RiskTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
