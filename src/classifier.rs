//! Risk Classifier (§4.C): a deterministic priority map from an alert list
//! to a single risk tag. Pure function of the alert list — same input always
//! yields the same tag (§8 property 5).

use crate::types::{AlertKind, RiskTag};

/// Priority order, highest wins, matching substrings of each alert's human
/// label (§4.C). Declaration order breaks ties among same-priority matches.
const PRIORITY: &[(&str, RiskTag)] = &[
    ("critical", RiskTag::CriticalPosture),
    ("high zone-3", RiskTag::GeneralPosture),
    ("neck", RiskTag::NeckFlexion),
    ("shoulder", RiskTag::ShoulderAlignment),
    ("stress", RiskTag::StressHigh),
];

pub fn classify(alerts: &[AlertKind]) -> RiskTag {
    let labels: Vec<String> = alerts.iter().map(AlertKind::label).collect();

    for (needle, tag) in PRIORITY {
        if labels.iter().any(|label| label.contains(needle)) {
            return *tag;
        }
    }

    if labels.iter().any(|label| is_negative_emotion_label(label)) {
        return RiskTag::NegativeEmotion;
    }

    RiskTag::GeneralPosture
}

fn is_negative_emotion_label(label: &str) -> bool {
    const NEGATIVE_TERMS: &[&str] = &["sad", "fear", "angry", "disgust", "negative emotion"];
    NEGATIVE_TERMS.iter().any(|term| label.contains(term))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PostureRegion;

    #[test]
    fn critical_wins_over_everything() {
        let alerts = vec![AlertKind::CriticalPosture, AlertKind::PersistentHighStress];
        assert_eq!(classify(&alerts), RiskTag::CriticalPosture);
    }

    #[test]
    fn neck_flexion_region_maps_to_neck_tag() {
        let alerts = vec![AlertKind::RegionAlert { region: PostureRegion::NeckFlexion, level3_plus: false }];
        assert_eq!(classify(&alerts), RiskTag::NeckFlexion);
    }

    #[test]
    fn neck_lateral_bend_region_also_maps_to_neck_tag() {
        let alerts = vec![AlertKind::RegionAlert { region: PostureRegion::NeckLateralBend, level3_plus: false }];
        assert_eq!(classify(&alerts), RiskTag::NeckFlexion);
    }

    #[test]
    fn negative_emotion_falls_through_to_emotion_tag() {
        let alerts = vec![AlertKind::PersistentEmotion("sad")];
        assert_eq!(classify(&alerts), RiskTag::NegativeEmotion);
    }

    #[test]
    fn empty_alert_list_falls_back_to_general_posture() {
        assert_eq!(classify(&[]), RiskTag::GeneralPosture);
    }

    #[test]
    fn is_pure_function_of_input() {
        let alerts = vec![AlertKind::PersistentHighStress];
        assert_eq!(classify(&alerts), classify(&alerts));
    }
}
