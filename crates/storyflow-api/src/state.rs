//! Shared application state.

use std::sync::{Arc, Mutex};

use storyflow_core::clock::Clock;
use storyflow_core::ids::IdGenerator;
use storyflow_draft::application::workspace::Workspace;
use storyflow_event_bus::EventBus;
use storyflow_graph::{GraphRepository, WorkspaceEvent};

/// Application state shared across all request handlers.
///
/// The workspace lock is never held across an `.await`.
#[derive(Clone)]
pub struct AppState {
    /// Clock used to stamp deltas and commits.
    pub clock: Arc<dyn Clock>,
    /// Persistence collaborator.
    pub repository: Arc<dyn GraphRepository>,
    /// The single editing session served by this process.
    pub workspace: Arc<Mutex<Workspace>>,
    /// Workspace event bus.
    pub bus: Arc<EventBus<WorkspaceEvent>>,
}

impl AppState {
    /// Create new application state with an empty workspace.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        repository: Arc<dyn GraphRepository>,
    ) -> Self {
        Self {
            bus: Arc::new(EventBus::new(clock.clone(), ids)),
            clock,
            repository,
            workspace: Arc::new(Mutex::new(Workspace::new())),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}
