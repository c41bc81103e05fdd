//! Cargo workspace integration
//!
//! - **metadata**: workspace discovery via cargo_metadata. This is the only
//!   place cargo-drift inspects manifests; everything downstream consumes the
//!   dependency graph built from it.

pub mod metadata;
