//! The 3-class-per-activity network (§4.E): `user_embed[U,d] ⊕ ctx_embed[C,d]`
//! through affine → ReLU → dropout → affine, reshaped to `[A,3]`.
//!
//! Hand-rolled forward/backward — no autodiff crate, matching the teacher's
//! preference for plain-`Vec<f64>` numerical code (`ml_engine/correlations.rs`,
//! `ml_engine/optimal_finder.rs`) over a heavier tensor framework.

use rand::Rng;

use crate::config::defaults::CLASS_REWARDS;

/// All learnable parameters. Shapes: `user_embed[U][d]`, `ctx_embed[C][d]`,
/// `w1[H][2d]`, `b1[H]`, `w2[A*3][H]`, `b2[A*3]`.
#[derive(Debug, Clone)]
pub struct NetParams {
    pub n_users: usize,
    pub n_contexts: usize,
    pub n_activities: usize,
    pub embed_dim: usize,
    pub hidden_dim: usize,

    pub user_embed: Vec<Vec<f64>>,
    pub ctx_embed: Vec<Vec<f64>>,
    pub w1: Vec<Vec<f64>>,
    pub b1: Vec<f64>,
    pub w2: Vec<Vec<f64>>,
    pub b2: Vec<f64>,
}

impl NetParams {
    pub fn random(n_users: usize, n_contexts: usize, n_activities: usize, embed_dim: usize, hidden_dim: usize) -> Self {
        let mut rng = rand::thread_rng();
        let scale = 0.1;
        let rand_vec = |rng: &mut rand::rngs::ThreadRng, n: usize| -> Vec<f64> {
            (0..n).map(|_| rng.gen_range(-scale..scale)).collect()
        };
        let rand_mat = |rng: &mut rand::rngs::ThreadRng, rows: usize, cols: usize| -> Vec<Vec<f64>> {
            (0..rows).map(|_| rand_vec(rng, cols)).collect()
        };

        Self {
            n_users,
            n_contexts,
            n_activities,
            embed_dim,
            hidden_dim,
            user_embed: rand_mat(&mut rng, n_users, embed_dim),
            ctx_embed: rand_mat(&mut rng, n_contexts, embed_dim),
            w1: rand_mat(&mut rng, hidden_dim, embed_dim * 2),
            b1: vec![0.0; hidden_dim],
            w2: rand_mat(&mut rng, n_activities * 3, hidden_dim),
            b2: vec![0.0; n_activities * 3],
        }
    }

    fn input_vector(&self, u: usize, c: usize) -> Vec<f64> {
        let mut x = Vec::with_capacity(self.embed_dim * 2);
        x.extend_from_slice(&self.user_embed[u]);
        x.extend_from_slice(&self.ctx_embed[c]);
        x
    }

    fn hidden(&self, x: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let pre1: Vec<f64> = (0..self.hidden_dim)
            .map(|h| {
                let row = &self.w1[h];
                row.iter().zip(x.iter()).map(|(w, v)| w * v).sum::<f64>() + self.b1[h]
            })
            .collect();
        let h: Vec<f64> = pre1.iter().map(|&v| v.max(0.0)).collect();
        (pre1, h)
    }

    fn logits3_for_row(&self, h_drop: &[f64], a: usize) -> [f64; 3] {
        let mut logits = [0.0; 3];
        for (k, logit) in logits.iter_mut().enumerate() {
            let row = &self.w2[a * 3 + k];
            *logit = row.iter().zip(h_drop.iter()).map(|(w, v)| w * v).sum::<f64>() + self.b2[a * 3 + k];
        }
        logits
    }

    /// Inference-mode forward for one activity: no dropout.
    pub fn forward_activity_eval(&self, u: usize, c: usize, a: usize) -> [f64; 3] {
        let x = self.input_vector(u, c);
        let (_pre1, h) = self.hidden(&x);
        self.logits3_for_row(&h, a)
    }

    /// Training-mode forward for one activity, applying inverted dropout and
    /// caching everything `backward_activity` needs.
    pub fn forward_activity_train(
        &self,
        u: usize,
        c: usize,
        a: usize,
        dropout_p: f64,
        rng: &mut impl Rng,
    ) -> ([f64; 3], ForwardCache) {
        let x = self.input_vector(u, c);
        let (pre1, h) = self.hidden(&x);

        let keep_prob = 1.0 - dropout_p;
        let mask: Vec<bool> = (0..h.len()).map(|_| rng.gen::<f64>() < keep_prob).collect();
        let h_drop: Vec<f64> = h
            .iter()
            .zip(mask.iter())
            .map(|(&v, &keep)| if keep { v / keep_prob } else { 0.0 })
            .collect();

        let logits = self.logits3_for_row(&h_drop, a);
        (logits, ForwardCache { x, pre1, h_drop, mask, keep_prob, u, c, a })
    }
}

/// Everything `backward_activity` needs to reconstruct gradients for one sample.
pub struct ForwardCache {
    x: Vec<f64>,
    pre1: Vec<f64>,
    h_drop: Vec<f64>,
    mask: Vec<bool>,
    keep_prob: f64,
    u: usize,
    c: usize,
    a: usize,
}

/// Gradient accumulators, same shapes as [`NetParams`].
#[derive(Debug, Clone)]
pub struct Gradients {
    pub user_embed: Vec<Vec<f64>>,
    pub ctx_embed: Vec<Vec<f64>>,
    pub w1: Vec<Vec<f64>>,
    pub b1: Vec<f64>,
    pub w2: Vec<Vec<f64>>,
    pub b2: Vec<f64>,
}

impl Gradients {
    pub fn zeros_like(p: &NetParams) -> Self {
        Self {
            user_embed: vec![vec![0.0; p.embed_dim]; p.n_users],
            ctx_embed: vec![vec![0.0; p.embed_dim]; p.n_contexts],
            w1: vec![vec![0.0; p.embed_dim * 2]; p.hidden_dim],
            b1: vec![0.0; p.hidden_dim],
            w2: vec![vec![0.0; p.hidden_dim]; p.n_activities * 3],
            b2: vec![0.0; p.n_activities * 3],
        }
    }

    fn scale(&mut self, factor: f64) {
        for row in self.user_embed.iter_mut().chain(self.ctx_embed.iter_mut()).chain(self.w1.iter_mut()).chain(self.w2.iter_mut()) {
            for v in row.iter_mut() {
                *v *= factor;
            }
        }
        for v in self.b1.iter_mut().chain(self.b2.iter_mut()) {
            *v *= factor;
        }
    }
}

/// softmax over 3 logits then dot with `CLASS_REWARDS` — the expected reward
/// `R = P · (reject=-1, postpone=0.1, accept=1)` (§4.E).
pub fn expected_reward(logits: &[f64; 3]) -> f64 {
    let probs = softmax3(logits);
    probs.iter().zip(CLASS_REWARDS.iter()).map(|(p, r)| p * r).sum()
}

pub fn softmax3(logits: &[f64; 3]) -> [f64; 3] {
    let max = logits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&v| (v - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    [exps[0] / sum, exps[1] / sum, exps[2] / sum]
}

/// Cross-entropy loss and gradient w.r.t. logits for one 3-class sample.
pub fn cross_entropy(logits: &[f64; 3], label: usize) -> (f64, [f64; 3]) {
    let probs = softmax3(logits);
    let loss = -(probs[label].max(1e-12)).ln();
    let mut dlogits = probs;
    dlogits[label] -= 1.0;
    (loss, dlogits)
}

/// Backprops one sample's `dlogits` through the shared hidden layer into
/// `grads`, touching only the 3 rows of `w2`/`b2` used by this activity.
pub fn backward_activity(params: &NetParams, cache: &ForwardCache, dlogits: [f64; 3], grads: &mut Gradients) {
    let h_len = params.hidden_dim;
    let mut dh_drop = vec![0.0; h_len];

    for k in 0..3 {
        let row_idx = cache.a * 3 + k;
        grads.b2[row_idx] += dlogits[k];
        let w2_row = &params.w2[row_idx];
        let grad_row = &mut grads.w2[row_idx];
        for h in 0..h_len {
            grad_row[h] += dlogits[k] * cache.h_drop[h];
            dh_drop[h] += dlogits[k] * w2_row[h];
        }
    }

    let dh: Vec<f64> = dh_drop
        .iter()
        .zip(cache.mask.iter())
        .map(|(&v, &keep)| if keep { v / cache.keep_prob } else { 0.0 })
        .collect();

    let d_pre1: Vec<f64> = dh
        .iter()
        .zip(cache.pre1.iter())
        .map(|(&v, &pre)| if pre > 0.0 { v } else { 0.0 })
        .collect();

    for h in 0..h_len {
        grads.b1[h] += d_pre1[h];
        let grad_row = &mut grads.w1[h];
        for (j, &xv) in cache.x.iter().enumerate() {
            grad_row[j] += d_pre1[h] * xv;
        }
    }

    let embed_dim = params.embed_dim;
    let mut dx = vec![0.0; embed_dim * 2];
    for h in 0..h_len {
        let w1_row = &params.w1[h];
        for j in 0..dx.len() {
            dx[j] += d_pre1[h] * w1_row[j];
        }
    }

    for j in 0..embed_dim {
        grads.user_embed[cache.u][j] += dx[j];
        grads.ctx_embed[cache.c][j] += dx[embed_dim + j];
    }
}

impl Gradients {
    pub fn average(&mut self, batch_size: usize) {
        if batch_size > 0 {
            self.scale(1.0 / batch_size as f64);
        }
    }
}

/// Adam optimiser state, dense over the same shapes as [`NetParams`] (§4.F).
pub struct Adam {
    lr: f64,
    beta1: f64,
    beta2: f64,
    eps: f64,
    t: u64,
    m: Gradients,
    v: Gradients,
}

impl Adam {
    pub fn new(params: &NetParams, lr: f64) -> Self {
        Self {
            lr,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
            t: 0,
            m: Gradients::zeros_like(params),
            v: Gradients::zeros_like(params),
        }
    }

    pub fn step(&mut self, params: &mut NetParams, grads: &Gradients) {
        self.t += 1;
        let t = self.t as i32;
        let bias1 = 1.0 - self.beta1.powi(t);
        let bias2 = 1.0 - self.beta2.powi(t);

        update_matrix(&mut params.user_embed, &grads.user_embed, &mut self.m.user_embed, &mut self.v.user_embed, self.beta1, self.beta2, self.eps, bias1, bias2, self.lr);
        update_matrix(&mut params.ctx_embed, &grads.ctx_embed, &mut self.m.ctx_embed, &mut self.v.ctx_embed, self.beta1, self.beta2, self.eps, bias1, bias2, self.lr);
        update_matrix(&mut params.w1, &grads.w1, &mut self.m.w1, &mut self.v.w1, self.beta1, self.beta2, self.eps, bias1, bias2, self.lr);
        update_matrix(&mut params.w2, &grads.w2, &mut self.m.w2, &mut self.v.w2, self.beta1, self.beta2, self.eps, bias1, bias2, self.lr);
        update_vector(&mut params.b1, &grads.b1, &mut self.m.b1, &mut self.v.b1, self.beta1, self.beta2, self.eps, bias1, bias2, self.lr);
        update_vector(&mut params.b2, &grads.b2, &mut self.m.b2, &mut self.v.b2, self.beta1, self.beta2, self.eps, bias1, bias2, self.lr);
    }
}

#[allow(clippy::too_many_arguments)]
fn update_vector(p: &mut [f64], g: &[f64], m: &mut [f64], v: &mut [f64], b1: f64, b2: f64, eps: f64, bias1: f64, bias2: f64, lr: f64) {
    for i in 0..p.len() {
        m[i] = b1 * m[i] + (1.0 - b1) * g[i];
        v[i] = b2 * v[i] + (1.0 - b2) * g[i] * g[i];
        let m_hat = m[i] / bias1;
        let v_hat = v[i] / bias2;
        p[i] -= lr * m_hat / (v_hat.sqrt() + eps);
    }
}

#[allow(clippy::too_many_arguments)]
fn update_matrix(p: &mut [Vec<f64>], g: &[Vec<f64>], m: &mut [Vec<f64>], v: &mut [Vec<f64>], b1: f64, b2: f64, eps: f64, bias1: f64, bias2: f64, lr: f64) {
    for row in 0..p.len() {
        update_vector(&mut p[row], &g[row], &mut m[row], &mut v[row], b1, b2, eps, bias1, bias2, lr);
    }
}
