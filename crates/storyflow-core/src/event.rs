//! Domain event abstractions and the envelope emitted to collaborators.

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::ids::IdGenerator;

/// Version stamped on every envelope.
pub const ENVELOPE_VERSION: u8 = 1;

/// Trait that all workspace events implement.
///
/// Implementors serialize as a `{ "type": ..., "payload": ... }` pair so the
/// envelope can flatten them next to its own metadata.
pub trait DomainEvent: Serialize + Clone + std::fmt::Debug + Send + Sync + 'static {
    /// Returns the event type name (used for handler routing).
    fn event_type(&self) -> &'static str;
}

/// Envelope carried on the event bus.
///
/// Serializes to `{version, id, ts, type, payload}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    /// Envelope format version; always [`ENVELOPE_VERSION`].
    pub version: u8,
    /// Unique envelope identifier.
    pub id: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub ts: i64,
    /// The typed event (`type` + `payload`).
    #[serde(flatten)]
    pub event: E,
}

impl<E: DomainEvent> EventEnvelope<E> {
    /// Wraps `event` in a fresh envelope stamped by `clock` and `ids`.
    pub fn new(event: E, clock: &dyn Clock, ids: &dyn IdGenerator) -> Self {
        Self {
            version: ENVELOPE_VERSION,
            id: ids.next_id(),
            ts: clock.now_millis(),
            event,
        }
    }

    /// Returns the routing key of the wrapped event.
    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }
}
