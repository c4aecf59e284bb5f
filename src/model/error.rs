//! Training error taxonomy (§10.2).

#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    /// CP decomposition hit a singular Gram matrix; embeddings were left random.
    #[error("tensor decomposition failed numerically")]
    Arithmetic,

    /// Fewer than `TRAIN_MIN_ROWS` feedback rows — the model is left not-ready (§4.F step 5).
    #[error("insufficient data for training: {0} rows")]
    InsufficientData(usize),

    /// Could not fetch training history from the row store.
    #[error("failed to fetch training history: {0}")]
    Gateway(#[from] crate::gateway::GatewayError),
}
