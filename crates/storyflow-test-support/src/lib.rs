//! Shared test mocks and fixtures for the Storyflow engine.

mod clock;
mod fixtures;
mod handlers;
mod ids;
mod repository;

pub use clock::FixedClock;
pub use fixtures::{fixed_time, linear_graph, scenario_graph};
pub use handlers::{FailingHandler, RecordingHandler};
pub use ids::SequenceIds;
pub use repository::{FailingGraphRepository, RecordingGraphRepository};
