//! Bounded jittered retry for transient gateway failures (§4.A), matching the
//! retry discipline the teacher applies in its fleet sync background tasks.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::debug;

use super::error::GatewayError;

/// Runs `attempt` up to `max_attempts` times, sleeping a jittered backoff
/// between attempts whenever the error is transient. Non-transient errors
/// (`NotFound`, `ShapeMismatch`) return immediately without retrying.
pub async fn with_retry<T, F, Fut>(
    max_attempts: u32,
    base_delay: Duration,
    jitter: Duration,
    mut attempt: F,
) -> Result<T, GatewayError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GatewayError>>,
{
    let mut last_err = None;
    for try_num in 1..=max_attempts.max(1) {
        match attempt().await {
            Ok(v) => return Ok(v),
            Err(e) if e.is_transient() && try_num < max_attempts => {
                let jitter_ms = if jitter.is_zero() {
                    0
                } else {
                    rand::thread_rng().gen_range(0..jitter.as_millis() as u64)
                };
                let delay = base_delay + Duration::from_millis(jitter_ms);
                debug!(attempt = try_num, delay_ms = delay.as_millis(), error = %e, "gateway call failed, retrying");
                tokio::time::sleep(delay).await;
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err.expect("loop runs at least once"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_transient_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result = with_retry(3, Duration::from_millis(1), Duration::from_millis(1), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(GatewayError::Transient("boom".into()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_not_found() {
        let calls = AtomicU32::new(0);
        let result: Result<i32, _> = with_retry(3, Duration::from_millis(1), Duration::from_millis(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(GatewayError::NotFound) }
        })
        .await;
        assert!(matches!(result, Err(GatewayError::NotFound)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausts_attempts_on_persistent_transient() {
        let calls = AtomicU32::new(0);
        let result: Result<i32, _> = with_retry(3, Duration::from_millis(1), Duration::from_millis(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(GatewayError::Transient("still down".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
