//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A test workspace with git history
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  /// Create a new test workspace with a virtual root manifest
  pub fn new() -> Result<Self> {
    let ws = Self::bare()?;

    std::fs::write(
      ws.path.join("Cargo.toml"),
      r#"[workspace]
members = ["crates/*"]
resolver = "2"
"#,
    )?;

    ws.commit("chore: workspace setup")?;
    Ok(ws)
  }

  /// Create a workspace whose root manifest is itself a package
  pub fn new_with_root_package(name: &str, version: &str) -> Result<Self> {
    let ws = Self::bare()?;

    std::fs::write(
      ws.path.join("Cargo.toml"),
      format!(
        r#"[package]
name = "{}"
version = "{}"
edition = "2021"

[workspace]
"#,
        name, version
      ),
    )?;
    std::fs::create_dir_all(ws.path.join("src"))?;
    std::fs::write(ws.path.join("src/lib.rs"), "pub fn hello() {}\n")?;

    ws.commit("chore: workspace setup")?;
    Ok(ws)
  }

  fn bare() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().canonicalize()?;

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    Ok(Self { _root: root, path })
  }

  /// Add a crate to the workspace, with path dependencies on sibling crates
  pub fn add_crate(&self, name: &str, version: &str, deps: &[&str]) -> Result<PathBuf> {
    let crate_path = self.path.join("crates").join(name);
    std::fs::create_dir_all(crate_path.join("src"))?;

    let mut cargo_toml = format!(
      r#"[package]
name = "{}"
version = "{}"
edition = "2021"

[dependencies]
"#,
      name, version
    );

    for dep in deps {
      cargo_toml.push_str(&format!("{} = {{ path = \"../{}\" }}\n", dep, dep));
    }

    std::fs::write(crate_path.join("Cargo.toml"), cargo_toml)?;
    std::fs::write(
      crate_path.join("src/lib.rs"),
      format!("//! {} crate\n\npub fn hello() {{}}\n", name),
    )?;

    Ok(crate_path)
  }

  /// Commit current changes, returning the commit SHA
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;

    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Tag HEAD with a release tag like `my-app@1.0.0`
  pub fn tag(&self, tag: &str) -> Result<()> {
    git(&self.path, &["tag", tag])?;
    Ok(())
  }

  /// Modify a file in a crate
  pub fn modify_file(&self, crate_name: &str, file: &str, content: &str) -> Result<()> {
    let file_path = self.path.join("crates").join(crate_name).join(file);
    std::fs::write(file_path, content)?;
    Ok(())
  }

  /// Rewrite a crate's declared version in its manifest
  pub fn set_version(&self, crate_name: &str, version: &str) -> Result<()> {
    let manifest_path = self.path.join("crates").join(crate_name).join("Cargo.toml");
    let manifest = std::fs::read_to_string(&manifest_path)?;

    let updated: String = manifest
      .lines()
      .map(|line| {
        if line.starts_with("version = ") {
          format!("version = \"{}\"", version)
        } else {
          line.to_string()
        }
      })
      .collect::<Vec<_>>()
      .join("\n")
      + "\n";

    std::fs::write(manifest_path, updated)?;
    Ok(())
  }

  /// Path to a crate's directory
  pub fn crate_path(&self, name: &str) -> PathBuf {
    self.path.join("crates").join(name)
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the cargo-drift CLI from a directory, returning stdout
pub fn run_cargo_drift(cwd: &Path, args: &[&str]) -> Result<String> {
  let bin = env!("CARGO_BIN_EXE_cargo-drift");

  let output = Command::new(bin)
    .current_dir(cwd)
    .arg("drift")
    .args(args)
    .output()
    .context("Failed to run cargo-drift")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "cargo-drift command failed: cargo drift {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
