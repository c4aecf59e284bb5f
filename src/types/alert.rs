//! The alert sum type (design note 9.1) produced by detection (§4.B) and
//! consumed by the risk classifier (§4.C).

use crate::types::PostureRegion;

#[derive(Debug, Clone, PartialEq)]
pub enum AlertKind {
    CriticalPosture,
    HighPosture,
    MediumPosture,
    RegionAlert { region: PostureRegion, level3_plus: bool },
    PersistentEmotion(&'static str),
    MultipleNegative,
    PersistentHighStress,
}

impl AlertKind {
    /// The human label the risk classifier pattern-matches against (§4.C).
    pub fn label(&self) -> String {
        match self {
            AlertKind::CriticalPosture => "critical posture alert".to_string(),
            AlertKind::HighPosture => "high zone-3 posture alert".to_string(),
            AlertKind::MediumPosture => "medium zone-2 posture alert".to_string(),
            AlertKind::RegionAlert { region, level3_plus } => {
                let zone = if *level3_plus { "zone-3" } else { "zone-2" };
                format!("{} region alert ({zone})", region.label())
            }
            AlertKind::PersistentEmotion(e) => format!("persistent {e} emotion"),
            AlertKind::MultipleNegative => "multiple negative emotions detected".to_string(),
            AlertKind::PersistentHighStress => "persistent high stress alert".to_string(),
        }
    }

    /// Whether this alert, on its own, is posture-domain level 3+ (for the
    /// cooldown priority rule in §4.G / §4.H).
    pub fn is_posture_level3_plus(&self) -> bool {
        matches!(
            self,
            AlertKind::CriticalPosture
                | AlertKind::HighPosture
                | AlertKind::RegionAlert { level3_plus: true, .. }
        )
    }

    pub fn is_posture_level2(&self) -> bool {
        matches!(
            self,
            AlertKind::MediumPosture | AlertKind::RegionAlert { level3_plus: false, .. }
        )
    }
}

/// A (triggered_user, alerts) pair produced by one detection pass.
#[derive(Debug, Clone)]
pub struct UserAlerts {
    pub user_id: String,
    pub alerts: Vec<AlertKind>,
}
