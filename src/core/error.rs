//! Error types for cargo-drift with contextual messages and exit codes
//!
//! All git stderr/exit-code pattern matching lives in `core::vcs`; the rest of
//! the crate reasons over the closed set of variants defined here.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Exit codes for cargo-drift
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (invalid args, not inside a workspace package)
  User = 1,
  /// System error (git, locking, I/O)
  System = 2,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for cargo-drift
#[derive(Debug)]
pub enum DriftError {
  /// Git operation errors
  Git(GitError),

  /// Workspace metadata discovery failed (cargo_metadata)
  Metadata(String),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message { message: String, context: Option<String> },
}

impl DriftError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    DriftError::Message {
      message: msg.into(),
      context: None,
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      DriftError::Message { message, context } => DriftError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      DriftError::Git(_) => ExitCode::System,
      DriftError::Metadata(_) => ExitCode::User,
      DriftError::Io(_) => ExitCode::System,
      DriftError::Message { .. } => ExitCode::User,
    }
  }
}

impl fmt::Display for DriftError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DriftError::Git(e) => write!(f, "{}", e),
      DriftError::Metadata(msg) => write!(f, "Workspace metadata error: {}", msg),
      DriftError::Io(e) => write!(f, "I/O error: {}", e),
      DriftError::Message { message, context } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for DriftError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      DriftError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for DriftError {
  fn from(err: io::Error) -> Self {
    DriftError::Io(err)
  }
}

impl From<GitError> for DriftError {
  fn from(err: GitError) -> Self {
    DriftError::Git(err)
  }
}

impl From<String> for DriftError {
  fn from(msg: String) -> Self {
    DriftError::message(msg)
  }
}

impl From<&str> for DriftError {
  fn from(msg: &str) -> Self {
    DriftError::message(msg)
  }
}

impl From<cargo_metadata::Error> for DriftError {
  fn from(err: cargo_metadata::Error) -> Self {
    DriftError::Metadata(err.to_string())
  }
}

impl From<serde_json::Error> for DriftError {
  fn from(err: serde_json::Error) -> Self {
    DriftError::message(format!("JSON error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for DriftError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    DriftError::message(format!("UTF-8 conversion error: {}", err))
  }
}

impl From<anyhow::Error> for DriftError {
  fn from(err: anyhow::Error) -> Self {
    DriftError::message(err.to_string())
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command exited non-zero for a reason we don't recognize as benign
  CommandFailed {
    command: String,
    exit_code: Option<i32>,
    stderr: String,
  },

  /// A referenced tag or commit does not exist
  UnknownRevision { rev: String },

  /// Cache lock could not be acquired within the bounded wait
  LockTimeout { path: PathBuf, waited: Duration },

  /// Repository not found at the given path
  RepoNotFound { path: PathBuf },
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed {
        command,
        exit_code,
        stderr,
      } => {
        let code = exit_code.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string());
        write!(f, "Git command failed ({}): {}\n{}", code, command, stderr)
      }
      GitError::UnknownRevision { rev } => {
        write!(f, "Unknown revision: {}", rev)
      }
      GitError::LockTimeout { path, waited } => {
        write!(
          f,
          "Timed out after {}s waiting for lock at: {}",
          waited.as_secs(),
          path.display()
        )
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
    }
  }
}

/// Result type alias for cargo-drift
pub type DriftResult<T> = Result<T, DriftError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> DriftResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<DriftError>,
{
  fn context(self, ctx: impl Into<String>) -> DriftResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }
}

/// Pretty-print an error to stderr
pub fn print_error(error: &DriftError) {
  eprintln!("\nerror: {}", error);
}
