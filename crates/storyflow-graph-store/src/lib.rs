//! Storyflow graph store.
//!
//! An in-memory `GraphRepository` for local authoring sessions and tests,
//! optionally seeded from a directory of JSON or YAML graph documents.

pub mod memory;
pub mod seed;

pub use memory::MemoryGraphRepository;
pub use seed::{SeedError, load_seed_dir};
