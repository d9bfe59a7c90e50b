//! A handler that records envelopes in the trace log.

use async_trait::async_trait;
use storyflow_core::error::StoryError;
use storyflow_core::event::{DomainEvent, EventEnvelope};
use tracing::info;

use crate::registry::EventHandler;

/// Logs every envelope it receives at `info` with its JSON payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHandler;

#[async_trait]
impl<E: DomainEvent> EventHandler<E> for LoggingHandler {
    async fn handle(&self, envelope: &EventEnvelope<E>) -> Result<(), StoryError> {
        let body = serde_json::to_string(&envelope.event)
            .map_err(|e| StoryError::Handler(format!("failed to encode event: {e}")))?;
        info!(
            event_type = envelope.event_type(),
            envelope_id = %envelope.id,
            ts = envelope.ts,
            event = %body,
            "event received"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Clone, Serialize)]
    #[serde(tag = "type", content = "payload")]
    enum TestEvent {
        #[serde(rename = "test.logged")]
        Logged { note: String },
    }

    impl DomainEvent for TestEvent {
        fn event_type(&self) -> &'static str {
            "test.logged"
        }
    }

    #[tokio::test]
    async fn test_logging_handler_accepts_any_event() {
        let envelope = EventEnvelope {
            version: 1,
            id: "evt-9".to_owned(),
            ts: 1,
            event: TestEvent::Logged {
                note: "hello".to_owned(),
            },
        };

        let result = LoggingHandler.handle(&envelope).await;

        assert!(result.is_ok());
    }
}
