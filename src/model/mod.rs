//! Personalisation Model (§4.E) and Training Loop (§4.F).
//!
//! The scorer's parameters live behind a single atomic snapshot pointer
//! (`arc-swap`), the same discipline the teacher uses for published model
//! state — readers take a local reference for the duration of one scoring
//! call so concurrent training never tears a read (§5).

mod cp_als;
mod error;
mod net;
mod train;

pub use error::TrainError;
pub use net::NetParams;
pub use train::{random_activity_index, run_training, TrainingOutcome};

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::types::{RiskTag, TimeContext};

/// An immutable, fully-trained snapshot: embeddings, network weights, and the
/// index maps that were current the moment training completed (§3 ownership:
/// "indices are owned by the Personalisation Model and invalidated atomically
/// when the model is retrained").
pub struct ModelSnapshot {
    pub user_index: HashMap<String, usize>,
    pub activity_index: HashMap<String, usize>,
    pub params: NetParams,
}

/// Contextual 3-class scorer: `score(user, context, activity) -> R` (§4.E).
pub struct ThreeClassScorer {
    snapshot: ArcSwapOption<ModelSnapshot>,
}

impl ThreeClassScorer {
    pub fn new() -> Self {
        Self { snapshot: ArcSwapOption::empty() }
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot.load().is_some()
    }

    /// Atomically publishes a newly trained snapshot, replacing any prior one.
    pub fn publish(&self, snapshot: ModelSnapshot) {
        self.snapshot.store(Some(Arc::new(snapshot)));
    }

    /// Scores one candidate activity for `user_id` at the given context.
    ///
    /// Returns `None` if the model is not trained or `user_id` is unseen —
    /// callers must then fall back to uniform random selection and tag the
    /// recommendation `source=COLD` (§4.E).
    pub fn score(&self, user_id: &str, ctx: TimeContext, activity_name: &str) -> Option<f64> {
        let snapshot = self.snapshot.load_full()?;
        let u = *snapshot.user_index.get(user_id)?;
        let a = *snapshot.activity_index.get(activity_name)?;
        let logits = snapshot.params.forward_activity_eval(u, ctx.index(), a);
        Some(net::expected_reward(&logits))
    }

    /// Scores every candidate in `candidates`, returning the best-scoring one
    /// alongside its score, or `None` if the model can't score this user at all.
    pub fn best_candidate<'a>(
        &self,
        user_id: &str,
        ctx: TimeContext,
        candidates: &'a [crate::types::Activity],
    ) -> Option<(&'a crate::types::Activity, f64)> {
        let snapshot = self.snapshot.load_full()?;
        let u = *snapshot.user_index.get(user_id)?;

        let mut best: Option<(&crate::types::Activity, f64)> = None;
        for activity in candidates {
            let Some(&a) = snapshot.activity_index.get(activity.name) else { continue };
            let logits = snapshot.params.forward_activity_eval(u, ctx.index(), a);
            let score = net::expected_reward(&logits);
            if best.map(|(_, s)| score > s).unwrap_or(true) {
                best = Some((activity, score));
            }
        }
        best
    }
}

impl Default for ThreeClassScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the flat global activity index from the catalog, stable across
/// calls since the catalog itself is `const`.
pub fn build_activity_index() -> HashMap<String, usize> {
    let mut names: Vec<&'static str> = Vec::new();
    for tag in RiskTag::ALL {
        for activity in crate::catalog::activities(tag) {
            if !names.contains(&activity.name) {
                names.push(activity.name);
            }
        }
    }
    names.into_iter().enumerate().map(|(i, n)| (n.to_string(), i)).collect()
}
