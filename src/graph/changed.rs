//! Change verdicts: which packages changed since their last release
//!
//! Two phases:
//! 1. Per package, did any file under its directory change since its last
//!    release tag? Packages with no release tag are changed by default -
//!    absence of history is not evidence of no change.
//! 2. Propagate "changed" to dependents: a package is changed if any of its
//!    dependencies is. Propagation is a fixed-point worklist over reverse
//!    edges, so dependency cycles converge instead of recursing forever.

use super::workspace_graph::WorkspaceGraph;
use crate::core::error::DriftResult;
use crate::core::vcs::{Git, ReleaseRange};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;

/// Final changed/unchanged decision for one package.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeVerdict {
  pub name: String,
  pub cwd: PathBuf,
  /// Files under the package's directory changed since its last release
  pub has_direct_changes: bool,
  /// Direct changes, or any dependency changed
  pub is_changed: bool,
}

/// Compute change verdicts for every workspace member, in member enumeration
/// order.
pub fn build(graph: &WorkspaceGraph, git: &Git) -> DriftResult<Vec<ChangeVerdict>> {
  let members = graph.members();

  // Independent packages; the git layer's cache is the only shared state.
  let direct: Vec<bool> = members
    .par_iter()
    .map(|name| has_direct_changes(graph, git, name))
    .collect::<DriftResult<Vec<_>>>()?;

  let has_direct: HashMap<&str, bool> = members
    .iter()
    .map(String::as_str)
    .zip(direct.iter().copied())
    .collect();

  let mut dependents_of = HashMap::new();
  for name in &members {
    dependents_of.insert(name.as_str(), graph.dependents_of(name)?);
  }

  let changed = propagate(&has_direct, &dependents_of);

  members
    .iter()
    .map(|name| {
      let node = graph.package(name)?;
      Ok(ChangeVerdict {
        name: node.name.clone(),
        cwd: node.cwd.clone(),
        has_direct_changes: has_direct[name.as_str()],
        is_changed: changed.contains(name.as_str()),
      })
    })
    .collect()
}

/// Whether any commit since the package's last release touches its directory.
fn has_direct_changes(graph: &WorkspaceGraph, git: &Git, name: &str) -> DriftResult<bool> {
  let node = graph.package(name)?;

  let Some(tag_commit) = git.release_tag_commit(&node.name, &node.version, graph.root())? else {
    // Never released: nothing to diff against, changed by default.
    return Ok(true);
  };

  let range = ReleaseRange::since(tag_commit);
  let commits = git.commits_in_range(&range, std::slice::from_ref(&node.cwd), graph.root())?;
  Ok(!commits.is_empty())
}

/// OR-reduce "changed" over reverse dependency edges to a fixed point.
///
/// Worklist seeded with the directly-changed set; each package flips to
/// changed at most once, so the loop terminates on cyclic graphs and the
/// result is independent of visit order.
fn propagate<'a>(
  has_direct: &HashMap<&'a str, bool>,
  dependents_of: &HashMap<&'a str, Vec<String>>,
) -> HashSet<&'a str> {
  let mut changed: HashSet<&str> = has_direct
    .iter()
    .filter(|(_, direct)| **direct)
    .map(|(name, _)| *name)
    .collect();

  let mut queue: VecDeque<&str> = changed.iter().copied().collect();

  while let Some(name) = queue.pop_front() {
    for dependent in dependents_of.get(name).into_iter().flatten() {
      // Resolve to the key borrowed from `has_direct` so lifetimes line up
      if let Some((&key, _)) = has_direct.get_key_value(dependent.as_str())
        && changed.insert(key)
      {
        queue.push_back(key);
      }
    }
  }

  changed
}
