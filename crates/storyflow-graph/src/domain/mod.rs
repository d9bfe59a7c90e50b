//! Domain layer of the narrative graph.

pub mod diagnostics;
pub mod document;
pub mod editor;
pub mod events;
pub mod handle;
pub mod hierarchy;
pub mod operations;
pub mod repository;
