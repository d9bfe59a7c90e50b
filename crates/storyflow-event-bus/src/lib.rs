//! Storyflow: event bus.
//!
//! Events are wrapped in a versioned envelope and routed to at most one
//! handler per event type. Handler failures propagate to whoever dispatched.

pub mod bus;
pub mod logging;
pub mod registry;

pub use bus::EventBus;
pub use logging::LoggingHandler;
pub use registry::{EventHandler, HandlerRegistry};
