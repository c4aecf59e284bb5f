//! Detection Queries (§4.B): windowed aggregation over posture/emotion rows
//! producing per-user alert lists.

mod chronic;
mod emotion;
mod posture;

pub use chronic::{run_chronic_checks, ChronicAlert, ChronicKind};
pub use emotion::detect_emotion;
pub use posture::detect_posture;

#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error(transparent)]
    Gateway(#[from] crate::gateway::GatewayError),
}
