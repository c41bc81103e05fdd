//! Git operations abstraction
//!
//! All repository access goes through [`Git`], a system-git subprocess layer
//! with an optional response cache. Concurrent invocations of cargo-drift
//! (parallel CI shards) may share a persistent cache directory; `lock`
//! serializes producers of the same cache entry across processes.

pub mod git;
pub mod lock;

pub use git::{CacheMode, Git};

/// A half-open commit interval `(from, to]` bounding one change check or one
/// changelog entry.
///
/// `from = None` means the range is unbounded below and covers everything
/// reachable from `to`, including the repository's root commit (the
/// pre-first-release case).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRange {
  /// Exclusive lower bound, or `None` for "since the beginning of history"
  pub from: Option<String>,
  /// Inclusive upper bound (a commit-ish, usually `HEAD` or a tag commit)
  pub to: String,
  /// The release tag this range ends at, if any
  pub tag: Option<String>,
}

impl ReleaseRange {
  /// Range from a known commit up to `HEAD`.
  pub fn since(from: impl Into<String>) -> Self {
    Self {
      from: Some(from.into()),
      to: "HEAD".to_string(),
      tag: None,
    }
  }

  /// Unbounded range covering all of history up to `HEAD`.
  pub fn from_root() -> Self {
    Self {
      from: None,
      to: "HEAD".to_string(),
      tag: None,
    }
  }

  /// The rev-list revision specification for this range.
  pub fn rev_spec(&self) -> String {
    match &self.from {
      Some(from) => format!("{}..{}", from, self.to),
      None => self.to.clone(),
    }
  }
}
