//! `cargo drift changelog` - release notes for the package at `cwd`

use crate::core::error::{DriftError, DriftResult};
use crate::core::vcs::Git;
use crate::graph::workspace_graph::WorkspaceGraph;
use crate::release::changelog::{ChangelogOptions, generate};
use crate::release::notes::ConventionalNotes;
use std::path::Path;

/// Generate the changelog for the workspace member whose directory contains
/// `cwd`.
pub fn get_changelog(git: &Git, cwd: &Path, options: &ChangelogOptions) -> DriftResult<String> {
  let workspace_root = git.workspace_root(cwd)?;
  let graph = WorkspaceGraph::load(&workspace_root)?;

  let package = graph.package_at(cwd).cloned().ok_or_else(|| {
    DriftError::message(format!(
      "No workspace package found at {}. Run from inside a package directory.",
      cwd.display()
    ))
  })?;

  let formatter = ConventionalNotes::new(git, &graph);
  generate(&graph, git, &package, &formatter, options)
}

/// Run the changelog command, printing the concatenated sections.
pub fn run_changelog(git: &Git, cwd: &Path, options: &ChangelogOptions) -> DriftResult<()> {
  print!("{}", get_changelog(git, cwd, options)?);
  Ok(())
}
