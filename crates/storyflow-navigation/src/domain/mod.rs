//! Domain layer for breadcrumb navigation.

pub mod breadcrumbs;
