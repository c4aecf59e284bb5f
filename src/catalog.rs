//! Recommendation Catalog (§4.D): a frozen mapping `risk_tag -> candidate
//! activities`. Content is carried over verbatim from the original
//! implementation's activity catalog (§10.7) since the distilled
//! specification fixes the mapping's shape but not its content.

use crate::types::{Activity, ActivityType, RiskTag};

const STRESS_HIGH: &[Activity] = &[
    Activity {
        name: "4-7-8 Breathing",
        activity_type: ActivityType::Breathing,
        duration: "2 min",
        description: "Relaxation technique",
        steps: &["Inhale 4s", "Hold 7s", "Exhale 8s"],
    },
    Activity {
        name: "Diaphragmatic Breathing",
        activity_type: ActivityType::Breathing,
        duration: "3 min",
        description: "Deep calm",
        steps: &["Hand on abdomen", "Deep inhale", "Feel the expansion"],
    },
    Activity {
        name: "Guided Visualization",
        activity_type: ActivityType::Breathing,
        duration: "3 min",
        description: "Mental escape",
        steps: &["Close eyes", "Imagine a safe place", "Breathe slowly"],
    },
];

const NEGATIVE_EMOTION: &[Activity] = &[
    Activity {
        name: "Mindful Coffee Break",
        activity_type: ActivityType::ActiveBreak,
        duration: "5 min",
        description: "Change of scenery",
        steps: &["Go to the kitchen", "Enjoy the aroma", "Breathe"],
    },
    Activity {
        name: "Brisk Walk",
        activity_type: ActivityType::ActiveBreak,
        duration: "5 min",
        description: "Activate endorphins",
        steps: &["Stand up", "Walk briskly", "Look out a window"],
    },
    Activity {
        name: "Power Stretching",
        activity_type: ActivityType::ActiveBreak,
        duration: "2 min",
        description: "Confidence posture",
        steps: &["Arms in a V above your head", "Take a deep breath", "Hold a genuine smile"],
    },
];

const NECK_FLEXION: &[Activity] = &[
    Activity {
        name: "Cervical Retraction",
        activity_type: ActivityType::PostureCorrection,
        duration: "2 min",
        description: "Corrects forward neck posture",
        steps: &["Chin back (double chin)", "Align ears with shoulders", "Hold 5s"],
    },
    Activity {
        name: "Lateral Stretch",
        activity_type: ActivityType::PostureCorrection,
        duration: "2 min",
        description: "Trapezius relief",
        steps: &["Ear toward shoulder", "Hand gently assists", "30s each side"],
    },
];

const SHOULDER_ALIGNMENT: &[Activity] = &[
    Activity {
        name: "Shoulder Rotation",
        activity_type: ActivityType::PostureCorrection,
        duration: "1 min",
        description: "Release tension",
        steps: &["Shoulders up", "Back and down", "Repeat 10 times"],
    },
    Activity {
        name: "Chest Opening",
        activity_type: ActivityType::PostureCorrection,
        duration: "2 min",
        description: "Counteract hunching",
        steps: &["Hands behind back", "Interlace fingers", "Stretch arms"],
    },
];

const CRITICAL_POSTURE: &[Activity] = &[
    Activity {
        name: "Full Reset",
        activity_type: ActivityType::UrgentBreak,
        duration: "5 min",
        description: "Urgent intervention",
        steps: &["Stand up now", "Walk", "Drink water", "Readjust your chair"],
    },
    Activity {
        name: "Spinal Stretch",
        activity_type: ActivityType::UrgentBreak,
        duration: "3 min",
        description: "Decompression",
        steps: &["Standing", "Touch your toes", "Roll up vertebra by vertebra"],
    },
];

const GENERAL_POSTURE: &[Activity] = &[
    Activity {
        name: "Ergonomic Check",
        activity_type: ActivityType::PostureCorrection,
        duration: "1 min",
        description: "Quick check",
        steps: &["Feet flat", "Knees at 90 degrees", "Screen at eye level"],
    },
    Activity {
        name: "Torso Rotation",
        activity_type: ActivityType::ActiveBreak,
        duration: "2 min",
        description: "Lumbar mobility",
        steps: &["Rotate torso right", "Grab the back of your chair", "Switch sides"],
    },
];

/// Returns the candidate activities for `tag`. Total over `RiskTag`: every
/// variant has a nonempty list, so the "absent tag" fallback from §4.D never
/// triggers for a well-typed caller — it only matters for [`activities_by_str`].
pub fn activities(tag: RiskTag) -> &'static [Activity] {
    match tag {
        RiskTag::StressHigh => STRESS_HIGH,
        RiskTag::NegativeEmotion => NEGATIVE_EMOTION,
        RiskTag::NeckFlexion => NECK_FLEXION,
        RiskTag::ShoulderAlignment => SHOULDER_ALIGNMENT,
        RiskTag::CriticalPosture => CRITICAL_POSTURE,
        RiskTag::GeneralPosture => GENERAL_POSTURE,
    }
}

/// Looks up activities by the tag's string form, falling back to
/// `general_posture` for any unrecognised tag (§4.D).
pub fn activities_by_str(tag: &str) -> &'static [Activity] {
    RiskTag::ALL
        .iter()
        .find(|t| t.as_str() == tag)
        .map(|t| activities(*t))
        .unwrap_or(GENERAL_POSTURE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tag_has_a_nonempty_candidate_list() {
        for tag in RiskTag::ALL {
            assert!(!activities(tag).is_empty(), "{tag} has no activities");
        }
    }

    #[test]
    fn unknown_tag_falls_back_to_general_posture() {
        let fallback = activities_by_str("not_a_real_tag");
        assert_eq!(fallback.as_ptr(), GENERAL_POSTURE.as_ptr());
    }
}
