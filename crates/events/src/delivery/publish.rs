//! Pub/sub publish envelopes and the broker transport seam.

use async_trait::async_trait;
use chatnotify_core::ChannelKey;
use serde::Serialize;
use serde_json::Value;

/// Error type for publish failures.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The broker could not be reached or the request failed in flight.
    #[error("Publish transport error: {0}")]
    Transport(String),

    /// The broker answered with a non-success status.
    #[error("Broker returned status {0}")]
    Status(u16),
}

/// One (channel, payload) pair ready for the broker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishEnvelope {
    pub channel: ChannelKey,
    pub payload: Value,
    /// Ask the broker to store the message for offline subscribers.
    pub durable: bool,
}

impl PublishEnvelope {
    /// A durable envelope; every routed event is stored for later retrieval.
    pub fn durable(channel: ChannelKey, payload: Value) -> Self {
        Self {
            channel,
            payload,
            durable: true,
        }
    }
}

/// Pub/sub broker client.
#[async_trait]
pub trait PublishTransport: Send + Sync {
    /// Publish `payload` on `channel`. Returns the broker's status code.
    async fn publish(&self, channel: &str, payload: &Value, durable: bool) -> Result<u16, PublishError>;
}
