//! Posture sample types (§3 PostureSample).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel for a region that the vision producer did not report this frame.
pub const REGION_MISSING: i8 = -1;

/// A single posture observation written by a vision client.
///
/// Invariant: `overall_zone` and each region zone are ordinal in `0..=4`, or
/// [`REGION_MISSING`] for a region that was not observed. `timestamp` is
/// monotone per user within a session, but the gateway never assumes a
/// global ordering across users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostureSample {
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub overall_zone: i8,
    pub neck_flexion: i8,
    pub neck_lateral_bend: i8,
    pub shoulder_alignment: i8,
    pub arm_abduction: i8,
}

impl PostureSample {
    pub fn region(&self, region: PostureRegion) -> i8 {
        match region {
            PostureRegion::NeckFlexion => self.neck_flexion,
            PostureRegion::NeckLateralBend => self.neck_lateral_bend,
            PostureRegion::ShoulderAlignment => self.shoulder_alignment,
            PostureRegion::ArmAbduction => self.arm_abduction,
        }
    }
}

/// The four tracked body regions, independent of `overall_zone`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostureRegion {
    NeckFlexion,
    NeckLateralBend,
    ShoulderAlignment,
    ArmAbduction,
}

impl PostureRegion {
    pub const ALL: [PostureRegion; 4] = [
        PostureRegion::NeckFlexion,
        PostureRegion::NeckLateralBend,
        PostureRegion::ShoulderAlignment,
        PostureRegion::ArmAbduction,
    ];

    /// Human label used by the risk classifier's substring matching (§4.C).
    pub fn label(&self) -> &'static str {
        match self {
            PostureRegion::NeckFlexion => "neck flexion",
            PostureRegion::NeckLateralBend => "neck lateral bend",
            PostureRegion::ShoulderAlignment => "shoulder alignment",
            PostureRegion::ArmAbduction => "arm abduction",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_accessor_matches_field() {
        let s = PostureSample {
            user_id: "7".into(),
            timestamp: Utc::now(),
            overall_zone: 4,
            neck_flexion: 2,
            neck_lateral_bend: 3,
            shoulder_alignment: -1,
            arm_abduction: 0,
        };
        assert_eq!(s.region(PostureRegion::NeckFlexion), 2);
        assert_eq!(s.region(PostureRegion::ShoulderAlignment), REGION_MISSING);
    }
}
