//! CP-ALS (alternating least squares) rank-`r` decomposition of the dense
//! `[n_users, n_contexts, n_activities]` interaction tensor, used only to
//! *initialise* the network's embeddings (§4.F step 4) before mini-batch
//! training takes over. Failure degrades silently: embeddings are left at
//! their random initial values and training proceeds regardless.
//!
//! No external tensor/linear-algebra crate — small, dense, `r <= embed_dim`
//! matrices only, so plain nested `Vec<f64>` and a hand-rolled Gauss-Jordan
//! solve are all this needs (matching the teacher's `ml_engine` style of
//! hand-rolled numerical routines over a heavyweight dependency).

type Mat = Vec<Vec<f64>>;

/// One factor per mode, each `[mode_size][rank]`.
pub struct CpFactors {
    pub users: Mat,
    pub contexts: Mat,
    pub activities: Mat,
}

/// Runs CP-ALS to rank `r` over `tensor` (dense, row-major
/// `[n_users, n_contexts, n_activities]`, unobserved cells filled with 0.0 by
/// the caller). Returns `None` on a singular Gram matrix at any sweep,
/// signalling "skip silently" to the caller (§4.F step 4).
pub fn decompose(tensor: &[f64], n_users: usize, n_contexts: usize, n_activities: usize, rank: usize, sweeps: usize) -> Option<CpFactors> {
    if n_users == 0 || n_contexts == 0 || n_activities == 0 || rank == 0 {
        return None;
    }

    let mut rng_state: u64 = 0x9E3779B97F4A7C15;
    let mut next = move || {
        rng_state ^= rng_state << 13;
        rng_state ^= rng_state >> 7;
        rng_state ^= rng_state << 17;
        (rng_state as f64 / u64::MAX as f64) * 0.2 - 0.1
    };

    let mut users = random_matrix(n_users, rank, &mut next);
    let mut contexts = random_matrix(n_contexts, rank, &mut next);
    let mut activities = random_matrix(n_activities, rank, &mut next);

    for _ in 0..sweeps {
        users = update_factor(
            &unfold_mode0(tensor, n_users, n_contexts, n_activities),
            &khatri_rao(&contexts, &activities),
            &contexts,
            &activities,
        )?;
        contexts = update_factor(
            &unfold_mode1(tensor, n_users, n_contexts, n_activities),
            &khatri_rao(&users, &activities),
            &users,
            &activities,
        )?;
        activities = update_factor(
            &unfold_mode2(tensor, n_users, n_contexts, n_activities),
            &khatri_rao(&users, &contexts),
            &users,
            &contexts,
        )?;
    }

    Some(CpFactors { users, contexts, activities })
}

fn random_matrix(rows: usize, cols: usize, next: &mut impl FnMut() -> f64) -> Mat {
    (0..rows).map(|_| (0..cols).map(|_| next()).collect()).collect()
}

/// Mode-0 unfolding: rows = users, cols = context*activities (context-major).
fn unfold_mode0(tensor: &[f64], n_users: usize, n_contexts: usize, n_activities: usize) -> Mat {
    let mut out = vec![vec![0.0; n_contexts * n_activities]; n_users];
    for u in 0..n_users {
        for c in 0..n_contexts {
            for a in 0..n_activities {
                out[u][c * n_activities + a] = tensor[(u * n_contexts + c) * n_activities + a];
            }
        }
    }
    out
}

/// Mode-1 unfolding: rows = contexts, cols = user*activities (user-major).
fn unfold_mode1(tensor: &[f64], n_users: usize, n_contexts: usize, n_activities: usize) -> Mat {
    let mut out = vec![vec![0.0; n_users * n_activities]; n_contexts];
    for u in 0..n_users {
        for c in 0..n_contexts {
            for a in 0..n_activities {
                out[c][u * n_activities + a] = tensor[(u * n_contexts + c) * n_activities + a];
            }
        }
    }
    out
}

/// Mode-2 unfolding: rows = activities, cols = user*contexts (user-major).
fn unfold_mode2(tensor: &[f64], n_users: usize, n_contexts: usize, n_activities: usize) -> Mat {
    let mut out = vec![vec![0.0; n_users * n_contexts]; n_activities];
    for u in 0..n_users {
        for c in 0..n_contexts {
            for a in 0..n_activities {
                out[a][u * n_contexts + c] = tensor[(u * n_contexts + c) * n_activities + a];
            }
        }
    }
    out
}

/// Khatri-Rao (column-wise Kronecker) product of `b[Bn][r]` and `a[An][r]`,
/// producing `[Bn*An][r]` with row `bi*An + ai = b[bi] ⊙ a[ai]`. This
/// ordering convention (outer index from `b`, inner from `a`) must match the
/// column ordering used by the corresponding mode unfolding above: mode-0's
/// unfolding is context-major over (context, activity), so its companion
/// Khatri-Rao is `khatri_rao(contexts, activities)`; mode-1/2 are user-major
/// and pair accordingly.
fn khatri_rao(b: &Mat, a: &Mat) -> Mat {
    let rank = b.first().map_or(0, Vec::len);
    let mut out = vec![vec![0.0; rank]; b.len() * a.len()];
    for (bi, b_row) in b.iter().enumerate() {
        for (ai, a_row) in a.iter().enumerate() {
            let row = &mut out[bi * a.len() + ai];
            for k in 0..rank {
                row[k] = b_row[k] * a_row[k];
            }
        }
    }
    out
}

/// `gram(m) = m^T * m`, an `[r][r]` matrix.
fn gram(m: &Mat) -> Mat {
    let rank = m.first().map_or(0, Vec::len);
    let mut g = vec![vec![0.0; rank]; rank];
    for row in m {
        for i in 0..rank {
            for j in 0..rank {
                g[i][j] += row[i] * row[j];
            }
        }
    }
    g
}

fn hadamard(a: &Mat, b: &Mat) -> Mat {
    a.iter()
        .zip(b.iter())
        .map(|(ra, rb)| ra.iter().zip(rb.iter()).map(|(x, y)| x * y).collect())
        .collect()
}

/// One ALS sweep for a factor: solve `factor * (khatri_rao^T khatri_rao) = unfolding * khatri_rao`
/// via `factor = unfolding * khatri_rao * pinv(gram(b) ⊙ gram(a))`.
fn update_factor(unfolding: &Mat, kr: &Mat, b: &Mat, a: &Mat) -> Option<Mat> {
    let rank = kr.first().map_or(0, Vec::len);
    let gram_had = hadamard(&gram(b), &gram(a));
    let inv = invert(&gram_had)?;

    // mtkrp = unfolding * kr, shape [mode_size][rank]
    let mtkrp: Mat = unfolding
        .iter()
        .map(|row| {
            let mut out = vec![0.0; rank];
            for (col_idx, &val) in row.iter().enumerate() {
                if val == 0.0 {
                    continue;
                }
                for k in 0..rank {
                    out[k] += val * kr[col_idx][k];
                }
            }
            out
        })
        .collect();

    Some(mtkrp.iter().map(|row| mat_vec_mul_row(row, &inv)).collect())
}

fn mat_vec_mul_row(row: &[f64], inv: &Mat) -> Vec<f64> {
    let rank = inv.len();
    (0..rank).map(|j| (0..rank).map(|k| row[k] * inv[k][j]).sum()).collect()
}

/// Gauss-Jordan inversion of a small square matrix. Returns `None` on a
/// (near-)singular pivot — the caller treats this as decomposition failure.
fn invert(m: &Mat) -> Option<Mat> {
    let n = m.len();
    if n == 0 {
        return None;
    }
    let mut aug: Mat = m
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut full = row.clone();
            full.extend((0..n).map(|j| if i == j { 1.0 } else { 0.0 }));
            full
        })
        .collect();

    for col in 0..n {
        let pivot_row = (col..n).max_by(|&a, &b| aug[a][col].abs().partial_cmp(&aug[b][col].abs()).unwrap())?;
        aug.swap(col, pivot_row);

        let pivot = aug[col][col];
        if pivot.abs() < 1e-10 {
            return None;
        }

        for v in aug[col].iter_mut() {
            *v /= pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = aug[row][col];
            if factor == 0.0 {
                continue;
            }
            for k in 0..(2 * n) {
                aug[row][k] -= factor * aug[col][k];
            }
        }
    }

    Some(aug.into_iter().map(|row| row[n..].to_vec()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert_identity_is_identity() {
        let id = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let inv = invert(&id).unwrap();
        assert!((inv[0][0] - 1.0).abs() < 1e-9);
        assert!((inv[1][1] - 1.0).abs() < 1e-9);
        assert!(inv[0][1].abs() < 1e-9);
    }

    #[test]
    fn invert_singular_matrix_returns_none() {
        let singular = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        assert!(invert(&singular).is_none());
    }

    #[test]
    fn decompose_on_small_dense_tensor_reduces_reconstruction_error() {
        let (nu, nc, na, r) = (3, 3, 2, 2);
        let tensor: Vec<f64> = (0..nu * nc * na).map(|i| ((i * 7) % 5) as f64 / 5.0).collect();

        let factors = decompose(&tensor, nu, nc, na, r, 10).expect("decomposition should succeed on well-posed input");

        let mut err = 0.0;
        for u in 0..nu {
            for c in 0..nc {
                for a in 0..na {
                    let recon: f64 = (0..r).map(|k| factors.users[u][k] * factors.contexts[c][k] * factors.activities[a][k]).sum();
                    let actual = tensor[(u * nc + c) * na + a];
                    err += (recon - actual).powi(2);
                }
            }
        }
        assert!(err.is_finite());
    }

    #[test]
    fn khatri_rao_shape_matches_row_product() {
        let b = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let a = vec![vec![5.0, 6.0]];
        let kr = khatri_rao(&b, &a);
        assert_eq!(kr.len(), 2);
        assert_eq!(kr[0], vec![5.0, 12.0]);
        assert_eq!(kr[1], vec![15.0, 24.0]);
    }
}
