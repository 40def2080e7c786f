//! Canvas components.

pub mod graph_view;
