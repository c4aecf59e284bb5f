//! Subscriber transport seam (§6). The chat transport itself is an external
//! collaborator out of scope (§1) — this module owns only the two pieces the
//! core is responsible for: the file-backed subscriber list, and the trait
//! boundary the dispatcher sends through. [`LoggingTransport`] is the
//! built-in implementation for standalone/CLI operation and for tests; a
//! real chat integration plugs in behind the same trait.

mod subscribers;

pub use subscribers::{SubscriberError, SubscriberStore};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport send failed: {0}")]
    Send(String),
}

/// One rendered outbound message, already escaped and formatted (§6).
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub text: String,
    /// Present only for messages that carry accept/postpone/reject buttons;
    /// informational `posture_l2` messages are button-less (§4.H step 3).
    pub recommendation_id: Option<String>,
}

/// The send half of the subscriber transport (§6). A single transport task
/// multiplexes all outbound messages (§5); dispatchers call through `&dyn`.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn send(&self, subscriber_id: i64, message: &OutboundMessage) -> Result<(), TransportError>;
}

/// Default transport: logs the rendered message instead of delivering it.
/// Send failures never roll back a cooldown fire (§4.H) — this impl never
/// fails, but a real transport's failures must be handled the same way.
#[derive(Debug, Default)]
pub struct LoggingTransport;

#[async_trait]
impl NotificationTransport for LoggingTransport {
    async fn send(&self, subscriber_id: i64, message: &OutboundMessage) -> Result<(), TransportError> {
        tracing::info!(subscriber_id, recommendation_id = ?message.recommendation_id, text = %message.text, "dispatched message");
        Ok(())
    }
}
