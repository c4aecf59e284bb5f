//! Catalog activity types (§4.D Recommendation Catalog).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Breathing,
    ActiveBreak,
    PostureCorrection,
    UrgentBreak,
}

/// One catalog entry: a concrete activity a user can be pointed at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub name: &'static str,
    pub activity_type: ActivityType,
    pub duration: &'static str,
    pub description: &'static str,
    pub steps: &'static [&'static str],
}
