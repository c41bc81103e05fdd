//! CLI commands for cargo-drift
//!
//! - **changed**: list workspace packages changed since their last release
//! - **changelog**: generate release notes for the package at the current
//!   directory
//!
//! Both commands share one `Git` instance so VCS responses are cached for the
//! whole invocation.

pub mod changed;
pub mod changelog;

pub use changed::run_changed;
pub use changelog::run_changelog;
