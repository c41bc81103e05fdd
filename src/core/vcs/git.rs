//! System git backend with a response cache
//!
//! Uses git plumbing commands for all operations. Optimized for:
//! - Safe subprocess execution (isolated environment)
//! - Response caching keyed by `(working directory, args)` - command outputs
//!   for a fixed commit range are immutable, so entries are never invalidated
//!   within a run
//! - Optional on-disk cache shared across concurrent CI invocations, guarded
//!   by per-entry lock files

use super::ReleaseRange;
use super::lock::{DEFAULT_LOCK_WAIT, LockFile};
use crate::core::error::{DriftError, DriftResult, GitError, ResultExt};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, trace};

/// How command responses are cached.
#[derive(Debug, Clone, Default)]
pub enum CacheMode {
  /// Always execute
  None,
  /// Cache in process-wide state keyed by `(cwd, args)`
  #[default]
  Memory,
  /// Memory cache backed by one file per key in the given directory,
  /// serialized across processes by per-key lock files
  Persistent(PathBuf),
}

/// Git backend using system git.
///
/// The cache is write-once per key for the life of the instance; construct a
/// fresh instance per invocation (or per test) for isolation.
pub struct Git {
  cache_mode: CacheMode,
  cache: Mutex<HashMap<String, String>>,
  lock_wait: Duration,
}

impl Git {
  pub fn new(cache_mode: CacheMode) -> Self {
    Self {
      cache_mode,
      cache: Mutex::new(HashMap::new()),
      lock_wait: DEFAULT_LOCK_WAIT,
    }
  }

  /// Override the bounded wait for persistent-cache lock acquisition.
  ///
  /// The default is ten minutes; the bound exists so parallel CI shards fail
  /// rather than deadlock on a wedged peer.
  pub fn with_lock_wait(mut self, lock_wait: Duration) -> Self {
    self.lock_wait = lock_wait;
    self
  }

  /// Execute a git command in `cwd`, returning trimmed stdout.
  ///
  /// Consults the cache first; on a persistent-cache miss the per-key lock is
  /// held for the read-execute-write cycle and released on all exit paths.
  pub fn execute(&self, args: &[&str], cwd: &Path) -> DriftResult<String> {
    let key = match self.cache_mode {
      CacheMode::None => return self.run(args, cwd),
      _ => cache_key(cwd, args),
    };

    if let Some(hit) = self.cache.lock().unwrap().get(&key) {
      trace!(%key, "git cache hit (memory)");
      return Ok(hit.clone());
    }

    let CacheMode::Persistent(dir) = &self.cache_mode else {
      let output = self.run(args, cwd)?;
      self
        .cache
        .lock()
        .unwrap()
        .entry(key)
        .or_insert_with(|| output.clone());
      return Ok(output);
    };

    fs::create_dir_all(dir)?;
    let lock_path = dir.join(format!("{}.lock", key));
    debug!(path = %lock_path.display(), "waiting for git cache lock");
    let _lock = LockFile::acquire(&lock_path, self.lock_wait)?;

    // First writer wins: a concurrent process may have populated the entry
    // while we waited on the lock.
    let entry_path = dir.join(&key);
    if let Ok(contents) = fs::read_to_string(&entry_path) {
      debug!(%key, "git cache hit (disk)");
      self.cache.lock().unwrap().insert(key, contents.clone());
      return Ok(contents);
    }

    debug!(%key, "git cache miss");
    let output = self.run(args, cwd)?;
    fs::write(&entry_path, &output)?;
    self.cache.lock().unwrap().insert(key, output.clone());
    Ok(output)
  }

  /// Run git without consulting the cache.
  fn run(&self, args: &[&str], cwd: &Path) -> DriftResult<String> {
    trace!(?args, cwd = %cwd.display(), "running git");

    let output = git_cmd(cwd)
      .args(args)
      .output()
      .context("Failed to execute git")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr).to_string();
      return Err(classify_failure(args, output.status.code(), stderr, cwd).into());
    }

    let stdout = String::from_utf8(output.stdout)?;
    Ok(stdout.trim_end().to_string())
  }

  // Derived operations. Each is a thin mapping over `execute`; these are the
  // vocabulary the graph and changelog layers speak.

  pub fn current_branch(&self, cwd: &Path) -> DriftResult<String> {
    self.execute(&["rev-parse", "--abbrev-ref", "HEAD"], cwd)
  }

  pub fn current_commit(&self, cwd: &Path) -> DriftResult<String> {
    self.execute(&["rev-parse", "HEAD"], cwd)
  }

  /// Root of the working tree containing `cwd`.
  pub fn workspace_root(&self, cwd: &Path) -> DriftResult<PathBuf> {
    Ok(PathBuf::from(self.execute(&["rev-parse", "--show-toplevel"], cwd)?))
  }

  /// Commit a tag points at. Fails with `UnknownRevision` when the tag does
  /// not exist.
  pub fn commit_at_tag(&self, tag: &str, cwd: &Path) -> DriftResult<String> {
    self.execute(&["rev-list", "-1", tag], cwd)
  }

  /// Oldest ancestor-less commit reachable from HEAD.
  ///
  /// With multiple root commits this takes the first line of rev-list output
  /// as-is; the selection among roots is deliberately not re-sorted.
  pub fn first_commit(&self, cwd: &Path) -> DriftResult<String> {
    let roots = self.execute(&["rev-list", "--max-parents=0", "HEAD"], cwd)?;
    Ok(lines_of(&roots).first().cloned().unwrap_or_default())
  }

  /// Whether `ancestor` is an ancestor of `descendant`.
  ///
  /// Exit codes 1 and 128 from the ancestry check mean "no"; only other
  /// failures propagate.
  pub fn is_ancestor(&self, ancestor: &str, descendant: &str, cwd: &Path) -> DriftResult<bool> {
    match self.execute(&["merge-base", "--is-ancestor", ancestor, descendant], cwd) {
      Ok(_) => Ok(true),
      Err(DriftError::Git(GitError::UnknownRevision { .. })) => Ok(false),
      Err(DriftError::Git(GitError::CommandFailed {
        exit_code: Some(1) | Some(128),
        ..
      })) => Ok(false),
      Err(err) => Err(err),
    }
  }

  /// Merge-base of two commits.
  pub fn common_ancestor(&self, commit_a: &str, commit_b: &str, cwd: &Path) -> DriftResult<String> {
    self.execute(&["merge-base", commit_a, commit_b], cwd)
  }

  /// File contents at a specific commit.
  pub fn file_at_commit(&self, path: &str, commit: &str, cwd: &Path) -> DriftResult<String> {
    let spec = format!("{}:{}", commit, path);
    self.execute(&["show", &spec], cwd)
  }

  /// Commit SHAs in a release range, oldest first, optionally restricted to
  /// commits touching any of `paths`.
  pub fn commits_in_range(&self, range: &ReleaseRange, paths: &[PathBuf], cwd: &Path) -> DriftResult<Vec<String>> {
    let spec = range.rev_spec();
    let mut args = vec!["rev-list", "--reverse", spec.as_str()];
    let path_args: Vec<String>;
    if !paths.is_empty() {
      args.push("--");
      path_args = paths.iter().map(|p| p.display().to_string()).collect();
      args.extend(path_args.iter().map(|s| s.as_str()));
    }
    Ok(lines_of(&self.execute(&args, cwd)?))
  }

  /// Subject line of a commit message.
  pub fn commit_subject(&self, sha: &str, cwd: &Path) -> DriftResult<String> {
    self.execute(&["log", "-1", "--format=%s", sha], cwd)
  }

  /// Committer date of a commit, as `YYYY-MM-DD`.
  pub fn commit_date(&self, sha: &str, cwd: &Path) -> DriftResult<String> {
    self.execute(&["log", "-1", "--format=%cs", sha], cwd)
  }

  /// Tag names matching a glob pattern.
  pub fn tags_matching(&self, pattern: &str, cwd: &Path) -> DriftResult<Vec<String>> {
    Ok(lines_of(&self.execute(&["tag", "--list", pattern], cwd)?))
  }

  /// Commit of a package's last release tag, or `None` when the package has
  /// never been tagged. Any failure other than an unknown tag propagates.
  pub fn release_tag_commit(&self, package_name: &str, version: &str, cwd: &Path) -> DriftResult<Option<String>> {
    let tag = release_tag(package_name, version);
    match self.commit_at_tag(&tag, cwd) {
      Ok(commit) => Ok(Some(commit)),
      Err(DriftError::Git(GitError::UnknownRevision { .. })) => Ok(None),
      Err(err) => Err(err),
    }
  }

  /// Lower bound for "changes since the last release": the last release tag's
  /// commit, falling back to the first commit for never-released packages.
  pub fn commit_since_last_release(&self, package_name: &str, version: &str, cwd: &Path) -> DriftResult<String> {
    match self.release_tag_commit(package_name, version, cwd)? {
      Some(commit) => Ok(commit),
      None => self.first_commit(cwd),
    }
  }
}

/// Compose the release tag for a package, stripping the `-detached` build
/// marker some CI flows append to versions. Other pre-release suffixes
/// (`1.2.0-beta.1`) are part of the released version and kept.
pub fn release_tag(package_name: &str, version: &str) -> String {
  let version = match version.find("-detached") {
    Some(idx) => &version[..idx],
    None => version,
  };
  format!("{}@{}", package_name, version)
}

/// Derive a filesystem-safe, collision-free cache key from `(cwd, args)`.
///
/// A sanitized prefix keeps entries recognizable when inspecting the cache
/// directory; the sha256 suffix guarantees distinct inputs never collide.
pub fn cache_key(cwd: &Path, args: &[&str]) -> String {
  let raw = std::iter::once(cwd.display().to_string())
    .chain(args.iter().map(|a| a.to_string()))
    .collect::<Vec<_>>()
    .join("\u{1f}");

  let digest = Sha256::digest(raw.as_bytes());

  let prefix: String = args
    .join("-")
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
    .take(48)
    .collect();

  format!("{}-{:x}", prefix, digest)
}

/// Split command output into non-empty lines.
fn lines_of(output: &str) -> Vec<String> {
  output
    .lines()
    .map(|l| l.trim().to_string())
    .filter(|l| !l.is_empty())
    .collect()
}

/// Create a git command with an isolated environment.
fn git_cmd(cwd: &Path) -> Command {
  let mut cmd = Command::new("git");

  cmd.arg("-C").arg(cwd);

  // Isolated environment (don't trust global config)
  cmd.env_clear();
  if let Ok(path) = std::env::var("PATH") {
    cmd.env("PATH", path);
  }
  if let Ok(home) = std::env::var("HOME") {
    cmd.env("HOME", home);
  }

  // Force safe behavior (override user config)
  cmd.arg("-c").arg("protocol.version=2");
  cmd.arg("-c").arg("advice.detachedHead=false");
  cmd.arg("-c").arg("core.quotePath=false");

  cmd
}

/// Map a non-zero git exit to the error taxonomy.
///
/// This is the single translation point from stderr text and exit codes to
/// structured error kinds; callers match on `GitError`, never on raw text.
fn classify_failure(args: &[&str], exit_code: Option<i32>, stderr: String, cwd: &Path) -> GitError {
  if stderr.contains("unknown revision or path not in the working tree")
    || stderr.contains("bad revision")
  {
    return GitError::UnknownRevision {
      rev: quoted_fragment(&stderr).unwrap_or_else(|| args.join(" ")),
    };
  }

  if stderr.contains("not a git repository") {
    return GitError::RepoNotFound {
      path: cwd.to_path_buf(),
    };
  }

  GitError::CommandFailed {
    command: format!("git {}", args.join(" ")),
    exit_code,
    stderr,
  }
}

/// Extract the first single-quoted fragment from git stderr, e.g. the revision
/// in `fatal: ambiguous argument 'pkg@1.0.0': unknown revision ...`.
fn quoted_fragment(stderr: &str) -> Option<String> {
  let start = stderr.find('\'')? + 1;
  let len = stderr[start..].find('\'')?;
  Some(stderr[start..start + len].to_string())
}
