//! Domain layer for the draft workflow.

pub mod cache;
pub mod commands;
pub mod delta;
pub mod draft;
