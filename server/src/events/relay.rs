use std::sync::Arc;

use async_trait::async_trait;

use super::{DecodeError, InboundEvent};
use crate::metrics;

/// A subscriber to inbound events. Handlers swallow and log their own faults.
#[async_trait]
pub trait EventHandler: Send + Sync {
    fn name(&self) -> &'static str;
    async fn handle(&self, event: &InboundEvent);
}

/// Bridges bus messages to the handlers registered at startup.
#[derive(Default)]
pub struct EventRelay {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listen(&mut self, handler: Arc<dyn EventHandler>) -> &mut Self {
        log::debug!("event handler {} registered", handler.name());
        self.handlers.push(handler);
        self
    }

    /// Runs every handler in registration order, one after another.
    pub async fn dispatch(&self, event: &InboundEvent) {
        log::info!("dispatching {} to {} handlers", event.name(), self.handlers.len());
        for handler in &self.handlers {
            handler.handle(event).await;
        }
        metrics::record_event(event.name());
    }

    pub async fn dispatch_raw(&self, raw: &str) {
        match InboundEvent::decode(raw) {
            Ok(event) => self.dispatch(&event).await,
            Err(DecodeError::Unknown(name)) => log::debug!("ignoring event {name}"),
            Err(e) => log::warn!("dropping bus message: {e}"),
        }
    }
}
