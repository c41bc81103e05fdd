//! Integration tests for the changed command

use crate::helpers::{run_cargo_drift, TestWorkspace};
use anyhow::Result;

#[test]
fn test_untagged_packages_are_changed() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("lib-a", "0.1.0", &[])?;
  ws.add_crate("lib-b", "0.1.0", &[])?;
  ws.commit("feat: add crates")?;

  let stdout = run_cargo_drift(&ws.path, &["changed"])?;

  assert!(stdout.contains("lib-a"));
  assert!(stdout.contains("lib-b"));

  Ok(())
}

#[test]
fn test_tagged_packages_without_commits_are_unchanged() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("lib-a", "0.1.0", &[])?;
  ws.commit("feat: add lib-a")?;
  ws.tag("lib-a@0.1.0")?;

  let stdout = run_cargo_drift(&ws.path, &["changed"])?;

  assert_eq!(stdout.trim(), "");

  Ok(())
}

#[test]
fn test_change_is_scoped_to_the_modified_package() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("lib-a", "0.1.0", &[])?;
  ws.add_crate("lib-b", "0.1.0", &[])?;
  ws.commit("feat: add crates")?;
  ws.tag("lib-a@0.1.0")?;
  ws.tag("lib-b@0.1.0")?;

  ws.modify_file("lib-a", "src/lib.rs", "pub fn hello() { let _ = 1; }\n")?;
  ws.commit("fix: tweak lib-a")?;

  let stdout = run_cargo_drift(&ws.path, &["changed"])?;
  let names: Vec<&str> = stdout.lines().collect();

  assert_eq!(names, vec!["lib-a"]);

  Ok(())
}

#[test]
fn test_dependency_change_propagates_to_dependents() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("lib-core", "0.1.0", &[])?;
  ws.add_crate("lib-api", "0.1.0", &["lib-core"])?;
  ws.commit("feat: add crates")?;
  ws.tag("lib-core@0.1.0")?;
  ws.tag("lib-api@0.1.0")?;

  ws.modify_file("lib-core", "src/lib.rs", "pub fn hello() { let _ = 2; }\n")?;
  ws.commit("fix: tweak lib-core")?;

  let stdout = run_cargo_drift(&ws.path, &["changed"])?;

  assert!(stdout.contains("lib-core"));
  assert!(stdout.contains("lib-api"));

  Ok(())
}

#[test]
fn test_propagation_follows_transitive_dependents() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("lib-base", "0.1.0", &[])?;
  ws.add_crate("lib-mid", "0.1.0", &["lib-base"])?;
  ws.add_crate("lib-top", "0.1.0", &["lib-mid"])?;
  ws.add_crate("lib-other", "0.1.0", &[])?;
  ws.commit("feat: add crates")?;
  ws.tag("lib-base@0.1.0")?;
  ws.tag("lib-mid@0.1.0")?;
  ws.tag("lib-top@0.1.0")?;
  ws.tag("lib-other@0.1.0")?;

  ws.modify_file("lib-base", "src/lib.rs", "pub fn hello() { let _ = 3; }\n")?;
  ws.commit("fix: tweak lib-base")?;

  let stdout = run_cargo_drift(&ws.path, &["changed"])?;
  let names: Vec<&str> = stdout.lines().collect();

  assert!(names.contains(&"lib-base"));
  assert!(names.contains(&"lib-mid"));
  assert!(names.contains(&"lib-top"));
  assert!(!names.contains(&"lib-other"));

  Ok(())
}

#[test]
fn test_works_from_a_package_directory() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("lib-a", "0.1.0", &[])?;
  ws.add_crate("lib-b", "0.1.0", &[])?;
  ws.commit("feat: add crates")?;
  ws.tag("lib-b@0.1.0")?;

  let stdout = run_cargo_drift(&ws.crate_path("lib-b"), &["changed"])?;
  let names: Vec<&str> = stdout.lines().collect();

  assert_eq!(names, vec!["lib-a"]);

  Ok(())
}

#[test]
fn test_root_package_uses_registry_name() -> Result<()> {
  let ws = TestWorkspace::new_with_root_package("root-app", "1.0.0")?;

  let stdout = run_cargo_drift(&ws.path, &["changed"])?;
  let names: Vec<&str> = stdout.lines().collect();

  assert_eq!(names, vec!["root-app"]);

  Ok(())
}

#[test]
fn test_repeated_runs_yield_identical_verdicts() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("lib-core", "0.1.0", &[])?;
  ws.add_crate("lib-api", "0.1.0", &["lib-core"])?;
  ws.add_crate("lib-other", "0.1.0", &[])?;
  ws.commit("feat: add crates")?;
  ws.tag("lib-core@0.1.0")?;
  ws.tag("lib-api@0.1.0")?;
  ws.tag("lib-other@0.1.0")?;

  ws.modify_file("lib-core", "src/lib.rs", "pub fn hello() { let _ = 5; }\n")?;
  ws.commit("fix: tweak lib-core")?;

  let first = run_cargo_drift(&ws.path, &["changed"])?;
  let second = run_cargo_drift(&ws.path, &["changed"])?;
  assert_eq!(first, second);

  let first_json = run_cargo_drift(&ws.path, &["changed", "--json"])?;
  let second_json = run_cargo_drift(&ws.path, &["changed", "--json"])?;
  assert_eq!(first_json, second_json);

  Ok(())
}

#[test]
fn test_json_output_includes_verdicts() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("lib-core", "0.1.0", &[])?;
  ws.add_crate("lib-api", "0.1.0", &["lib-core"])?;
  ws.commit("feat: add crates")?;
  ws.tag("lib-core@0.1.0")?;
  ws.tag("lib-api@0.1.0")?;

  ws.modify_file("lib-core", "src/lib.rs", "pub fn hello() { let _ = 4; }\n")?;
  ws.commit("fix: tweak lib-core")?;

  let stdout = run_cargo_drift(&ws.path, &["changed", "--json"])?;
  let verdicts: serde_json::Value = serde_json::from_str(&stdout)?;

  let entries = verdicts.as_array().expect("expected a JSON array");
  let core = entries
    .iter()
    .find(|v| v["name"] == "lib-core")
    .expect("lib-core verdict");
  let api = entries
    .iter()
    .find(|v| v["name"] == "lib-api")
    .expect("lib-api verdict");

  assert_eq!(core["has_direct_changes"], true);
  assert_eq!(core["is_changed"], true);
  assert_eq!(api["has_direct_changes"], false);
  assert_eq!(api["is_changed"], true);

  Ok(())
}
