//! Graph-aware workspace analysis
//!
//! Built on cargo_metadata + petgraph for direct control and minimal abstraction.
//! No guppy - we own our domain types and queries.

pub mod changed;
pub mod workspace_graph;

pub use changed::ChangeVerdict;
pub use workspace_graph::WorkspaceGraph;
