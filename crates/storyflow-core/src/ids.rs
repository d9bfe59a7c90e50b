//! Identifier generation abstraction for determinism.
//!
//! In production, identifiers are time-ordered UUIDs. In tests a sequential
//! implementation is injected so envelopes and created graphs get predictable
//! ids.

use uuid::Uuid;

/// Abstraction over unique identifier generation.
pub trait IdGenerator: Send + Sync {
    /// Returns a new identifier, unique for the lifetime of the process.
    fn next_id(&self) -> String;
}

/// Production generator backed by UUID v7 (time-ordered).
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        Uuid::now_v7().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_generator_produces_distinct_parseable_ids() {
        let ids = UuidIdGenerator;

        let first = ids.next_id();
        let second = ids.next_id();

        assert_ne!(first, second);
        Uuid::parse_str(&first).unwrap();
        Uuid::parse_str(&second).unwrap();
    }
}
