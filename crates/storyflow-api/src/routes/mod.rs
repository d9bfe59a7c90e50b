//! Route modules, one per resource.

pub mod breadcrumbs;
pub mod draft;
pub mod events;
pub mod graphs;
pub mod health;
pub mod hierarchy;
