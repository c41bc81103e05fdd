//! Changelog windowing over a package's release-tag history
//!
//! Computes the commit ranges a changelog should cover and hands each one to
//! a formatter. Three shapes:
//!
//! - default: one range since the package's last release tag (or all of
//!   history when it has never been tagged)
//! - `from_commit`: one range from an explicit commit to HEAD, for
//!   partial/unreleased-only notes
//! - `release_count = N`: the unreleased range (when it has commits) plus up
//!   to N historical releases, each bounded by consecutive tag commits; the
//!   oldest window is unbounded below so the root commit is covered

use super::notes::ChangelogFormatter;
use crate::core::error::DriftResult;
use crate::core::vcs::{Git, ReleaseRange};
use crate::graph::workspace_graph::{PackageNode, WorkspaceGraph};
use semver::Version;
use std::path::PathBuf;

/// Options for [`generate`].
#[derive(Debug, Clone, Default)]
pub struct ChangelogOptions {
  /// Explicit lower bound, overriding tag-based lookup
  pub from_commit: Option<String>,
  /// Number of historical releases to include
  pub release_count: Option<usize>,
}

/// Generate the concatenated changelog for one package, newest section first.
pub fn generate(
  graph: &WorkspaceGraph,
  git: &Git,
  package: &PackageNode,
  formatter: &dyn ChangelogFormatter,
  options: &ChangelogOptions,
) -> DriftResult<String> {
  let windows = if let Some(from) = &options.from_commit {
    vec![ReleaseRange::since(from.clone())]
  } else if let Some(count) = options.release_count {
    release_windows(graph, git, package, count)?
  } else {
    vec![default_window(git, package, graph)?]
  };

  let mut output = String::new();
  for window in &windows {
    output.push_str(&formatter.format(package, window)?);
  }
  Ok(output)
}

/// The paths a package's notes are scoped to: its own directory plus the
/// directories of its transitive internal dependencies, so a dependency-only
/// change still surfaces in the dependent's notes.
pub(crate) fn scope_paths(graph: &WorkspaceGraph, package: &PackageNode) -> DriftResult<Vec<PathBuf>> {
  let mut paths = vec![package.cwd.clone()];
  for dep in graph.transitive_dependencies(&package.name)? {
    paths.push(graph.package(&dep)?.cwd.clone());
  }
  Ok(paths)
}

/// Single range from the last release to HEAD. Pre-first-tag packages get
/// the unbounded range so the root commit is covered.
fn default_window(git: &Git, package: &PackageNode, graph: &WorkspaceGraph) -> DriftResult<ReleaseRange> {
  match git.release_tag_commit(&package.name, &package.version, graph.root())? {
    Some(commit) => Ok(ReleaseRange::since(commit)),
    None => Ok(ReleaseRange::from_root()),
  }
}

/// Windows for `release_count = N`: unreleased (only when non-empty), then up
/// to N tagged releases, newest first. Asking for more releases than exist
/// stops at the root of history rather than failing.
fn release_windows(
  graph: &WorkspaceGraph,
  git: &Git,
  package: &PackageNode,
  count: usize,
) -> DriftResult<Vec<ReleaseRange>> {
  let tags = release_tags(git, package, graph)?;

  if tags.is_empty() {
    return Ok(vec![ReleaseRange::from_root()]);
  }

  let mut boundaries = Vec::with_capacity(tags.len());
  for (_, tag) in &tags {
    boundaries.push(git.commit_at_tag(tag, graph.root())?);
  }

  let mut windows = Vec::new();

  let unreleased = ReleaseRange::since(boundaries[0].clone());
  let paths = scope_paths(graph, package)?;
  if !git.commits_in_range(&unreleased, &paths, graph.root())?.is_empty() {
    windows.push(unreleased);
  }

  for i in 0..count.min(tags.len()) {
    windows.push(ReleaseRange {
      from: boundaries.get(i + 1).cloned(),
      to: boundaries[i].clone(),
      tag: Some(tags[i].1.clone()),
    });
  }

  Ok(windows)
}

/// The package's release tags, semver-sorted descending (most recent first).
pub(crate) fn release_tags(
  git: &Git,
  package: &PackageNode,
  graph: &WorkspaceGraph,
) -> DriftResult<Vec<(Version, String)>> {
  let pattern = format!("{}@*", package.name);
  let mut tags: Vec<(Version, String)> = git
    .tags_matching(&pattern, graph.root())?
    .into_iter()
    .filter_map(|tag| {
      let (_, version_str) = tag.split_once('@')?;
      let version = version_str.parse::<Version>().ok()?;
      Some((version, tag))
    })
    .collect();

  tags.sort_by(|a, b| b.0.cmp(&a.0));
  Ok(tags)
}
