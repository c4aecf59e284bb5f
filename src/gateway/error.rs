//! Gateway error taxonomy (§4.A, §7).

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Transport failure or timeout; eligible for bounded retry.
    #[error("transient store error: {0}")]
    Transient(String),

    /// The queried row does not exist.
    #[error("row not found")]
    NotFound,

    /// A row was returned but missing an expected column, or a column had an
    /// unexpected type — schema evolved underneath us.
    #[error("row shape mismatch: {0}")]
    ShapeMismatch(String),

    /// The raw transport error, wrapped for `?`-propagation from inside a
    /// single attempt; the retry loop classifies these as `Transient`.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
}

impl GatewayError {
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Transient(_) | GatewayError::Request(_))
    }
}
