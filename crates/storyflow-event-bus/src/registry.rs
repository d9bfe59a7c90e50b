//! One-handler-per-type dispatch registry.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use storyflow_core::error::StoryError;
use storyflow_core::event::{DomainEvent, EventEnvelope};
use tracing::debug;

/// A collaborator notified of one event type.
#[async_trait]
pub trait EventHandler<E: DomainEvent>: Send + Sync {
    /// Handle a dispatched envelope.
    async fn handle(&self, envelope: &EventEnvelope<E>) -> Result<(), StoryError>;
}

/// Maps event types to their single handler.
pub struct HandlerRegistry<E: DomainEvent> {
    handlers: RwLock<HashMap<String, Arc<dyn EventHandler<E>>>>,
}

impl<E: DomainEvent> Default for HandlerRegistry<E> {
    fn default() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }
}

impl<E: DomainEvent> std::fmt::Debug for HandlerRegistry<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("event_types", &self.registered_types())
            .finish()
    }
}

impl<E: DomainEvent> HandlerRegistry<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `event_type`.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::HandlerConflict` if a handler is already
    /// registered for this type.
    pub fn register(
        &self,
        event_type: &str,
        handler: Arc<dyn EventHandler<E>>,
    ) -> Result<(), StoryError> {
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if handlers.contains_key(event_type) {
            return Err(StoryError::HandlerConflict(event_type.to_owned()));
        }
        handlers.insert(event_type.to_owned(), handler);
        debug!(event_type, "registered event handler");
        Ok(())
    }

    /// Removes the handler for `event_type`. Returns whether one was present.
    pub fn unregister(&self, event_type: &str) -> bool {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(event_type)
            .is_some()
    }

    #[must_use]
    pub fn has_handler(&self, event_type: &str) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(event_type)
    }

    /// Registered event types, sorted.
    #[must_use]
    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        types.sort();
        types
    }

    /// Removes every handler.
    pub fn clear(&self) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Routes `envelope` to its handler. An envelope with no handler is
    /// dropped.
    ///
    /// # Errors
    ///
    /// Propagates the handler's error unchanged.
    pub async fn dispatch(&self, envelope: &EventEnvelope<E>) -> Result<(), StoryError> {
        let handler = {
            let handlers = self
                .handlers
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            handlers.get(envelope.event_type()).cloned()
        };
        match handler {
            Some(handler) => handler.handle(envelope).await,
            None => {
                debug!(
                    event_type = envelope.event_type(),
                    "no handler registered; event dropped"
                );
                Ok(())
            }
        }
    }
}
