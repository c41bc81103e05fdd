//! Utility functions for cross-platform path handling

use std::path::Path;

/// Compare two paths after resolving symlinks.
///
/// Plain string equality is not enough: macOS aliases `/tmp` through
/// `/private`, and workspace roots are routinely reached through symlinks in
/// CI. Paths that cannot be canonicalized (e.g. they don't exist) compare
/// unequal.
pub fn paths_equal(a: &Path, b: &Path) -> bool {
  match (a.canonicalize(), b.canonicalize()) {
    (Ok(a), Ok(b)) => a == b,
    _ => false,
  }
}

/// The final component of a path as a display name.
pub fn base_name(path: &Path) -> String {
  path
    .file_name()
    .map(|n| n.to_string_lossy().to_string())
    .unwrap_or_else(|| path.display().to_string())
}
