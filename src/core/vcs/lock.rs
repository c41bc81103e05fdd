//! Cross-process lock files for the persistent git cache
//!
//! Parallel CI shards share one cache directory; a per-key lock file
//! serializes producers and consumers of the same entry. Acquisition polls
//! with a bounded wait and fails rather than waiting forever.

use crate::core::error::{DriftResult, GitError};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default bound on how long we wait for another process to release a lock.
///
/// Matches the upstream CI policy of ten minutes.
pub const DEFAULT_LOCK_WAIT: Duration = Duration::from_secs(10 * 60);

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// An exclusive advisory lock on a file, released on drop.
#[derive(Debug)]
pub struct LockFile {
  path: PathBuf,
  file: File,
}

impl LockFile {
  /// Acquire an exclusive lock at `path`, waiting up to `max_wait`.
  ///
  /// Fails with `GitError::LockTimeout` when the bound is exceeded.
  pub fn acquire(path: &Path, max_wait: Duration) -> DriftResult<Self> {
    let file = OpenOptions::new().create(true).truncate(false).write(true).open(path)?;

    let start = Instant::now();
    loop {
      match file.try_lock_exclusive() {
        Ok(()) => {
          debug!(path = %path.display(), "acquired cache lock");
          return Ok(Self {
            path: path.to_path_buf(),
            file,
          });
        }
        Err(err) if err.kind() == fs2::lock_contended_error().kind() => {
          if start.elapsed() >= max_wait {
            return Err(
              GitError::LockTimeout {
                path: path.to_path_buf(),
                waited: start.elapsed(),
              }
              .into(),
            );
          }
          thread::sleep(POLL_INTERVAL);
        }
        Err(err) => return Err(err.into()),
      }
    }
  }
}

impl Drop for LockFile {
  fn drop(&mut self) {
    let _ = FileExt::unlock(&self.file);
    debug!(path = %self.path.display(), "released cache lock");
  }
}
