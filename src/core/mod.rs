//! Core building blocks for cargo-drift
//!
//! - **error**: error taxonomy with exit codes and context helpers
//! - **vcs**: git subprocess layer with response caching and cross-process
//!   cache locking

pub mod error;
pub mod vcs;
