//! `cargo drift changed` - list packages changed since their last release
//!
//! A package's display name is its directory base name, except for the
//! package living at the workspace root, which reports its registry name.
//! The comparison is canonical-path based so symlinked roots (macOS
//! `/private`, CI mounts) resolve correctly.

use crate::core::error::DriftResult;
use crate::core::vcs::Git;
use crate::graph::changed;
use crate::graph::workspace_graph::WorkspaceGraph;
use crate::utils::{base_name, paths_equal};
use std::path::Path;
use tracing::debug;

/// Names of changed packages, in member enumeration order.
pub fn list_changed_packages(git: &Git, cwd: &Path) -> DriftResult<Vec<String>> {
  let workspace_root = git.workspace_root(cwd)?;
  debug!(root = %workspace_root.display(), branch = %git.current_branch(cwd)?, "analyzing workspace");

  let graph = WorkspaceGraph::load(&workspace_root)?;
  let verdicts = changed::build(&graph, git)?;

  Ok(
    verdicts
      .iter()
      .filter(|verdict| verdict.is_changed)
      .map(|verdict| {
        if paths_equal(&verdict.cwd, &workspace_root) {
          verdict.name.clone()
        } else {
          base_name(&verdict.cwd)
        }
      })
      .collect(),
  )
}

/// Run the changed command, printing one name per line, or full verdicts as
/// JSON.
pub fn run_changed(git: &Git, cwd: &Path, json: bool) -> DriftResult<()> {
  if json {
    let workspace_root = git.workspace_root(cwd)?;
    let graph = WorkspaceGraph::load(&workspace_root)?;
    let verdicts = changed::build(&graph, git)?;
    println!("{}", serde_json::to_string_pretty(&verdicts)?);
    return Ok(());
  }

  for name in list_changed_packages(git, cwd)? {
    println!("{}", name);
  }
  Ok(())
}
