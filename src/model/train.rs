//! Training Loop (§4.F): pulls response history, builds the dense interaction
//! tensor, attempts a CP-ALS warm start, then runs mini-batch Adam and
//! publishes the resulting snapshot.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::ModelSettings;
use crate::gateway::{RowStoreGateway, TrainingRow};
use crate::types::TimeContext;

use super::cp_als;
use super::net::{self, Adam, Gradients, NetParams};
use super::{ModelSnapshot, TrainError, ThreeClassScorer};

/// Outcome of one training attempt, for callers (the CLI entry point, an
/// optional periodic retrain task) to log or report on.
#[derive(Debug, Clone)]
pub enum TrainingOutcome {
    /// Training completed and a new snapshot was published.
    Trained { rows: usize, final_epoch_loss: f64, warm_started: bool },
    /// Too few feedback rows; the model (and any previous snapshot) is left untouched.
    NotReady { rows: usize },
}

struct Sample {
    user: usize,
    context: usize,
    activity: usize,
    label: usize,
}

/// Runs one full training pass and, on success, publishes the result into
/// `scorer`. Never panics on sparse or small input — degrades to
/// [`TrainingOutcome::NotReady`] per §4.F step 5.
pub async fn run_training(
    gateway: &dyn RowStoreGateway,
    settings: &ModelSettings,
    scorer: &ThreeClassScorer,
) -> Result<TrainingOutcome, TrainError> {
    let rows = gateway.history_for_training().await?;

    if rows.len() < settings.train_min_rows {
        return Ok(TrainingOutcome::NotReady { rows: rows.len() });
    }

    let user_index = build_user_index(&rows);
    let activity_index = super::build_activity_index();

    let n_users = user_index.len();
    let n_contexts = TimeContext::COUNT;
    let n_activities = activity_index.len().max(1);

    let samples = to_samples(&rows, &user_index, &activity_index);

    let mut params = NetParams::random(n_users, n_contexts, n_activities, settings.embedding_dim, settings.hidden_dim);
    let warm_started = warm_start(&mut params, &samples, n_users, n_contexts, n_activities, settings.embedding_dim);

    let mut adam = Adam::new(&params, settings.train_learning_rate);
    let mut rng = rand::thread_rng();

    let mut final_epoch_loss = 0.0;
    for _epoch in 0..settings.train_epochs {
        let mut order: Vec<usize> = (0..samples.len()).collect();
        order.shuffle(&mut rng);

        let mut epoch_loss = 0.0;
        let mut epoch_count = 0usize;

        for batch in order.chunks(settings.train_batch_size) {
            let mut grads = Gradients::zeros_like(&params);
            let mut batch_loss = 0.0;

            for &idx in batch {
                let s = &samples[idx];
                let (logits, cache) = params.forward_activity_train(s.user, s.context, s.activity, settings.dropout_p, &mut rng);
                let (loss, dlogits) = net::cross_entropy(&logits, s.label);
                net::backward_activity(&params, &cache, dlogits, &mut grads);
                batch_loss += loss;
            }

            grads.average(batch.len());
            adam.step(&mut params, &grads);

            epoch_loss += batch_loss;
            epoch_count += batch.len();
        }

        final_epoch_loss = if epoch_count > 0 { epoch_loss / epoch_count as f64 } else { 0.0 };
    }

    scorer.publish(ModelSnapshot { user_index, activity_index, params });

    Ok(TrainingOutcome::Trained { rows: rows.len(), final_epoch_loss, warm_started })
}

fn build_user_index(rows: &[TrainingRow]) -> HashMap<String, usize> {
    let mut index = HashMap::new();
    for row in rows {
        let next = index.len();
        index.entry(row.triggered_user_id.clone()).or_insert(next);
    }
    index
}

fn to_samples(rows: &[TrainingRow], user_index: &HashMap<String, usize>, activity_index: &HashMap<String, usize>) -> Vec<Sample> {
    rows.iter()
        .filter_map(|row| {
            let user = *user_index.get(&row.triggered_user_id)?;
            let activity = *activity_index.get(&row.activity_name)?;
            let context = TimeContext::from_timestamp(row.response_created_at).index();
            let (label, _reward) = row.response.label_and_reward();
            Some(Sample { user, context, activity, label })
        })
        .collect()
}

/// Attempts a CP-ALS warm start of the user/context embeddings from the
/// reward tensor. On any numerical failure this is a no-op and training
/// proceeds from the random initial embeddings (§4.F step 4).
fn warm_start(params: &mut NetParams, samples: &[Sample], n_users: usize, n_contexts: usize, n_activities: usize, rank: usize) -> bool {
    let mut tensor = vec![0.0_f64; n_users * n_contexts * n_activities];
    for s in samples {
        let (_label, reward) = reward_for(s.label);
        tensor[(s.user * n_contexts + s.context) * n_activities + s.activity] = reward;
    }

    let Some(factors) = cp_als::decompose(&tensor, n_users, n_contexts, n_activities, rank, 10) else {
        return false;
    };

    for (u, row) in factors.users.iter().enumerate() {
        params.user_embed[u] = row.clone();
    }
    for (c, row) in factors.contexts.iter().enumerate() {
        params.ctx_embed[c] = row.clone();
    }
    true
}

fn reward_for(label: usize) -> (usize, f64) {
    (label, crate::config::defaults::CLASS_REWARDS[label])
}

/// Uniform-random fallback used when the model has no snapshot yet or cannot
/// score a given user/activity — tags the caller's recommendation `source=COLD` (§4.E).
pub fn random_activity_index(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        rand::thread_rng().gen_range(0..n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;

    use crate::gateway::{GatewayError, LeaderboardEntry};
    use crate::types::{EmotionSample, GamificationEntry, PostureSample, Recommendation, Response, ResponseKind};

    struct FakeGateway {
        rows: Mutex<Vec<TrainingRow>>,
    }

    #[async_trait]
    impl RowStoreGateway for FakeGateway {
        async fn recent_posture(&self, _since: DateTime<Utc>) -> Result<Vec<PostureSample>, GatewayError> {
            Ok(vec![])
        }
        async fn recent_emotions(&self, _since: DateTime<Utc>, _emotions: Option<&[crate::types::Emotion]>) -> Result<Vec<EmotionSample>, GatewayError> {
            Ok(vec![])
        }
        async fn insert_recommendation(&self, _rec: &Recommendation) -> Result<(), GatewayError> {
            Ok(())
        }
        async fn insert_response(&self, _resp: &Response) -> Result<(), GatewayError> {
            Ok(())
        }
        async fn gamification_get(&self, _user_id: &str) -> Result<Option<GamificationEntry>, GatewayError> {
            Ok(None)
        }
        async fn gamification_upsert(&self, _user_id: &str, _points: f64) -> Result<(), GatewayError> {
            Ok(())
        }
        async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, GatewayError> {
            Ok(vec![])
        }
        async fn history_for_training(&self) -> Result<Vec<TrainingRow>, GatewayError> {
            Ok(self.rows.lock().unwrap().clone())
        }
        async fn stress_scores(&self, _user_id: &str, _days: i64) -> Result<Vec<f64>, GatewayError> {
            Ok(vec![])
        }
        async fn high_risk_posture_count(&self, _user_id: &str, _days: i64) -> Result<u64, GatewayError> {
            Ok(0)
        }
        async fn known_user_ids(&self) -> Result<Vec<String>, GatewayError> {
            Ok(vec![])
        }
    }

    fn sample_rows(n: usize) -> Vec<TrainingRow> {
        let activities = ["Ergonomic Check", "Full Reset", "4-7-8 Breathing"];
        (0..n)
            .map(|i| TrainingRow {
                triggered_user_id: format!("user-{}", i % 3),
                activity_name: activities[i % activities.len()].to_string(),
                response_created_at: Utc::now(),
                response: match i % 3 {
                    0 => ResponseKind::Accept,
                    1 => ResponseKind::Postpone,
                    _ => ResponseKind::Reject,
                },
            })
            .collect()
    }

    #[tokio::test]
    async fn too_few_rows_yields_not_ready_and_leaves_scorer_unready() {
        let gateway = FakeGateway { rows: Mutex::new(sample_rows(2)) };
        let settings = ModelSettings::default();
        let scorer = ThreeClassScorer::new();

        let outcome = run_training(&gateway, &settings, &scorer).await.unwrap();
        assert!(matches!(outcome, TrainingOutcome::NotReady { rows: 2 }));
        assert!(!scorer.is_ready());
    }

    #[tokio::test]
    async fn sufficient_rows_trains_and_publishes_a_ready_snapshot() {
        let gateway = FakeGateway { rows: Mutex::new(sample_rows(30)) };
        let mut settings = ModelSettings::default();
        settings.train_epochs = 2;
        settings.train_batch_size = 8;
        let scorer = ThreeClassScorer::new();

        let outcome = run_training(&gateway, &settings, &scorer).await.unwrap();
        assert!(matches!(outcome, TrainingOutcome::Trained { rows: 30, .. }));
        assert!(scorer.is_ready());

        let score = scorer.score("user-0", TimeContext::Morning, "Ergonomic Check");
        assert!(score.is_some());
    }
}
