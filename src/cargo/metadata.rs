use crate::core::error::DriftResult;
use cargo_metadata::{MetadataCommand, Package};
use std::path::Path;

/// Workspace introspection using cargo_metadata
#[derive(Clone)]
pub struct WorkspaceMetadata {
  metadata: cargo_metadata::Metadata,
}

impl WorkspaceMetadata {
  pub fn load(workspace_root: &Path) -> DriftResult<Self> {
    let metadata = MetadataCommand::new()
      .manifest_path(workspace_root.join("Cargo.toml"))
      .exec()?;
    Ok(Self { metadata })
  }

  /// Workspace member packages only; path and registry dependencies outside
  /// the workspace are not listed here.
  pub fn members(&self) -> Vec<&Package> {
    self.metadata.workspace_packages()
  }

  pub fn workspace_root(&self) -> &Path {
    self.metadata.workspace_root.as_std_path()
  }
}
