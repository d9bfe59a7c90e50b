//! Storyflow: draft workflow.
//!
//! Edits land in a draft buffer and are logged as deltas; a commit swaps the
//! draft into the committed buffer only when diagnostics report no blocking
//! issues. The workspace ties the draft to a graph cache, breadcrumb history
//! and the persistence seam.

pub mod application;
pub mod domain;
