//! Storyflow: breadcrumb navigation.
//!
//! Authors jump between narratives and storylets; each graph kind keeps its
//! own history stack so returning from a storylet detour lands where they
//! left off.

pub mod domain;

pub use domain::breadcrumbs::{Breadcrumb, BreadcrumbNavigator};
