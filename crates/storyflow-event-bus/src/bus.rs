//! Envelope-stamping front of the registry.

use std::sync::Arc;

use storyflow_core::clock::Clock;
use storyflow_core::error::StoryError;
use storyflow_core::event::{DomainEvent, EventEnvelope};
use storyflow_core::ids::IdGenerator;
use tracing::{debug, instrument};

use crate::registry::{EventHandler, HandlerRegistry};

/// Wraps events in envelopes and dispatches them.
pub struct EventBus<E: DomainEvent> {
    registry: HandlerRegistry<E>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl<E: DomainEvent> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl<E: DomainEvent> EventBus<E> {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            registry: HandlerRegistry::new(),
            clock,
            ids,
        }
    }

    /// The underlying registry.
    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry<E> {
        &self.registry
    }

    /// Shorthand for [`HandlerRegistry::register`].
    ///
    /// # Errors
    ///
    /// Returns `StoryError::HandlerConflict` on a duplicate registration.
    pub fn subscribe(
        &self,
        event_type: &str,
        handler: Arc<dyn EventHandler<E>>,
    ) -> Result<(), StoryError> {
        self.registry.register(event_type, handler)
    }

    /// Stamps `event` with a fresh envelope and dispatches it.
    ///
    /// # Errors
    ///
    /// Propagates the handler's error.
    #[instrument(skip(self, event), fields(event_type = event.event_type()))]
    pub async fn publish(&self, event: E) -> Result<EventEnvelope<E>, StoryError> {
        let envelope = EventEnvelope::new(event, self.clock.as_ref(), self.ids.as_ref());
        debug!(envelope_id = %envelope.id, "publishing event");
        self.registry.dispatch(&envelope).await?;
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use serde::Serialize;

    #[derive(Debug, Clone, Serialize)]
    #[serde(tag = "type", content = "payload")]
    enum TestEvent {
        #[serde(rename = "test.ping")]
        Ping,
    }

    impl DomainEvent for TestEvent {
        fn event_type(&self) -> &'static str {
            "test.ping"
        }
    }

    struct Frozen(DateTime<Utc>);

    impl Clock for Frozen {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[derive(Default)]
    struct Counter(AtomicU64);

    impl IdGenerator for Counter {
        fn next_id(&self) -> String {
            format!("evt-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    #[derive(Default)]
    struct Collecting(Mutex<Vec<String>>);

    #[async_trait]
    impl EventHandler<TestEvent> for Collecting {
        async fn handle(&self, envelope: &EventEnvelope<TestEvent>) -> Result<(), StoryError> {
            self.0.lock().unwrap().push(envelope.id.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_publish_stamps_envelope_and_dispatches() {
        // Arrange
        let instant = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let bus: EventBus<TestEvent> =
            EventBus::new(Arc::new(Frozen(instant)), Arc::new(Counter::default()));
        let handler = Arc::new(Collecting::default());
        bus.subscribe("test.ping", handler.clone()).unwrap();

        // Act
        let first = bus.publish(TestEvent::Ping).await.unwrap();
        let second = bus.publish(TestEvent::Ping).await.unwrap();

        // Assert
        assert_eq!(first.version, 1);
        assert_eq!(first.ts, instant.timestamp_millis());
        assert_eq!(first.id, "evt-1");
        assert_eq!(second.id, "evt-2");
        assert_eq!(
            *handler.0.lock().unwrap(),
            vec!["evt-1".to_owned(), "evt-2".to_owned()]
        );
    }

    #[tokio::test]
    async fn test_publish_without_subscriber_still_returns_envelope() {
        let instant = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let bus: EventBus<TestEvent> =
            EventBus::new(Arc::new(Frozen(instant)), Arc::new(Counter::default()));

        let envelope = bus.publish(TestEvent::Ping).await.unwrap();

        assert_eq!(envelope.event_type(), "test.ping");
        assert!(bus.registry().registered_types().is_empty());
    }
}
