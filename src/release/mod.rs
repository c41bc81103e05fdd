//! Per-crate changelog generation bounded by release history
//!
//! # Core Invariants
//!
//! 1. **Changelogs are per-crate, not global**
//!    - Each crate's notes are scoped to commits touching its own directory
//!      and the directories of its internal dependencies
//!
//! 2. **Windows are bounded by release tags**
//!    - The default window runs from the crate's last `<name>@<version>` tag
//!      to HEAD; `--releases N` walks back through up to N historical tags
//!    - A crate that has never been tagged gets one window covering all of
//!      history, so the pre-first-release case still produces notes
//!
//! 3. **This module decides boundaries, not versions**
//!    - Version inference for unreleased commits belongs to the formatter;
//!      the windower only supplies correct commit ranges

pub mod changelog;
pub mod notes;

pub use changelog::{ChangelogOptions, generate};
pub use notes::{ChangelogFormatter, ConventionalNotes};
