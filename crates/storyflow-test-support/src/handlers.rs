//! Test event handlers.

use std::sync::Mutex;

use async_trait::async_trait;
use storyflow_core::error::StoryError;
use storyflow_core::event::{DomainEvent, EventEnvelope};
use storyflow_event_bus::EventHandler;

/// Records every envelope it handles.
#[derive(Debug)]
pub struct RecordingHandler<E> {
    received: Mutex<Vec<EventEnvelope<E>>>,
}

impl<E> Default for RecordingHandler<E> {
    fn default() -> Self {
        Self {
            received: Mutex::new(Vec::new()),
        }
    }
}

impl<E: Clone> RecordingHandler<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the envelopes handled so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn received(&self) -> Vec<EventEnvelope<E>> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl<E: DomainEvent> EventHandler<E> for RecordingHandler<E> {
    async fn handle(&self, envelope: &EventEnvelope<E>) -> Result<(), StoryError> {
        self.received.lock().unwrap().push(envelope.clone());
        Ok(())
    }
}

/// A handler that always fails with `StoryError::Handler`.
#[derive(Debug)]
pub struct FailingHandler;

#[async_trait]
impl<E: DomainEvent> EventHandler<E> for FailingHandler {
    async fn handle(&self, _envelope: &EventEnvelope<E>) -> Result<(), StoryError> {
        Err(StoryError::Handler("handler exploded".into()))
    }
}
