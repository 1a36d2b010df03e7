use std::sync::Mutex;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};

use super::{Envelope, OutboundEvent};

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("cannot encode event: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("redis publish failed: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("publisher lock poisoned")]
    Poisoned,
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &OutboundEvent) -> Result<(), PublishError>;
}

pub struct RedisPublisher {
    client: RedisClient,
    channel: String,
}

impl RedisPublisher {
    pub fn new(client: RedisClient, channel: impl Into<String>) -> Self {
        Self {
            client,
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl EventPublisher for RedisPublisher {
    async fn publish(&self, event: &OutboundEvent) -> Result<(), PublishError> {
        let payload = serde_json::to_string(&event.to_envelope()?)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.publish(&self.channel, payload).await?;
        log::debug!("published {} on {}", event.name(), self.channel);
        Ok(())
    }
}

/// Keeps every published envelope in memory.
#[derive(Default)]
pub struct RecordingPublisher {
    sent: Mutex<Vec<Envelope>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<Envelope> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: &OutboundEvent) -> Result<(), PublishError> {
        let envelope = event.to_envelope()?;
        self.sent
            .lock()
            .map_err(|_| PublishError::Poisoned)?
            .push(envelope);
        Ok(())
    }
}
