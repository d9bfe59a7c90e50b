//! Storyflow Core: shared domain abstractions.
//!
//! This crate defines the error taxonomy, the time and identifier seams, and
//! the event envelope that every other Storyflow crate depends on. It
//! contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod ids;
