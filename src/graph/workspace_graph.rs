//! Workspace dependency graph built from cargo_metadata + petgraph
//!
//! ## Graph Structure
//!
//! - **Directed Graph**: `A → B` means "A depends on B"
//! - **Nodes**: workspace members only; external dependencies are invisible
//! - **Edges**: internal dependency relationships
//! - **Cycles**: permitted - the graph is a general digraph, not a DAG, and
//!   every traversal carries a visited set
//!
//! The graph is built once per invocation and read-only afterwards.

use crate::cargo::metadata::WorkspaceMetadata;
use crate::core::error::{DriftError, DriftResult};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// A package node in the dependency graph.
#[derive(Debug, Clone)]
pub struct PackageNode {
  pub name: String,
  /// Declared version string from the manifest
  pub version: String,
  /// The package's working directory (parent of its Cargo.toml)
  pub cwd: PathBuf,
}

/// Workspace dependency graph.
///
/// Built from cargo_metadata, using petgraph for efficient traversals.
pub struct WorkspaceGraph {
  graph: DiGraph<PackageNode, ()>,

  /// Index: package name → node index
  name_to_node: HashMap<String, NodeIndex>,

  /// Root working directory of the workspace
  root: PathBuf,
}

impl WorkspaceGraph {
  /// Load the workspace graph rooted at `workspace_root`.
  ///
  /// One node per workspace member; dependency edges are restricted to
  /// targets that are also members. Every forward edge implies the matching
  /// reverse edge by construction (petgraph stores both directions).
  pub fn load(workspace_root: &Path) -> DriftResult<Self> {
    let metadata = WorkspaceMetadata::load(workspace_root)?;

    let mut graph = DiGraph::new();
    let mut name_to_node = HashMap::new();

    let members = metadata.members();
    let member_names: HashSet<String> = members.iter().map(|pkg| pkg.name.to_string()).collect();

    for package in &members {
      let cwd = package
        .manifest_path
        .parent()
        .map(|p| p.as_std_path().to_path_buf())
        .unwrap_or_else(|| package.manifest_path.clone().into_std_path_buf());

      let node = PackageNode {
        name: package.name.to_string(),
        version: package.version.to_string(),
        cwd,
      };

      let node_idx = graph.add_node(node);
      name_to_node.insert(package.name.to_string(), node_idx);
    }

    for package in &members {
      let from_idx = name_to_node[package.name.as_str()];

      for dep in &package.dependencies {
        if member_names.contains(dep.name.as_str()) {
          let to_idx = name_to_node[dep.name.as_str()];
          graph.add_edge(from_idx, to_idx, ());
        }
      }
    }

    Ok(Self {
      graph,
      name_to_node,
      root: metadata.workspace_root().to_path_buf(),
    })
  }

  /// Root working directory of the workspace.
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// All member names, sorted. This is the enumeration order every report
  /// follows, so output is deterministic within a run.
  pub fn members(&self) -> Vec<String> {
    let mut members: Vec<_> = self.name_to_node.keys().cloned().collect();
    members.sort();
    members
  }

  /// The node for a member package.
  pub fn package(&self, name: &str) -> DriftResult<&PackageNode> {
    Ok(&self.graph[self.find_node(name)?])
  }

  /// Direct internal dependents of a member (what uses it).
  pub fn dependents_of(&self, name: &str) -> DriftResult<Vec<String>> {
    let node_idx = self.find_node(name)?;

    let mut dependents: Vec<String> = self
      .graph
      .neighbors_directed(node_idx, Direction::Incoming)
      .map(|idx| self.graph[idx].name.clone())
      .collect();

    dependents.sort();
    dependents.dedup();
    Ok(dependents)
  }

  /// All members the named package depends on, directly or transitively.
  ///
  /// DFS with a visited set, so dependency cycles terminate.
  pub fn transitive_dependencies(&self, name: &str) -> DriftResult<Vec<String>> {
    self.reachable_from(name, Direction::Outgoing)
  }

  fn reachable_from(&self, name: &str, direction: Direction) -> DriftResult<Vec<String>> {
    let start_node = self.find_node(name)?;

    let mut visited = HashSet::new();
    let mut stack = vec![start_node];
    let mut reached = HashSet::new();

    while let Some(node_idx) = stack.pop() {
      if !visited.insert(node_idx) {
        continue;
      }

      for neighbor_idx in self.graph.neighbors_directed(node_idx, direction) {
        if neighbor_idx != start_node {
          reached.insert(self.graph[neighbor_idx].name.clone());
        }
        stack.push(neighbor_idx);
      }
    }

    let mut result: Vec<_> = reached.into_iter().collect();
    result.sort();
    Ok(result)
  }

  /// The member whose working directory contains `dir`, compared canonically
  /// so symlinked paths resolve to the same package. When member directories
  /// nest (a root package with members below it) the deepest match wins.
  pub fn package_at(&self, dir: &Path) -> Option<&PackageNode> {
    let dir = dir.canonicalize().ok()?;
    self
      .graph
      .node_indices()
      .map(|idx| &self.graph[idx])
      .filter(|node| {
        node
          .cwd
          .canonicalize()
          .is_ok_and(|cwd| dir.starts_with(cwd))
      })
      .max_by_key(|node| node.cwd.components().count())
  }

  fn find_node(&self, name: &str) -> DriftResult<NodeIndex> {
    self.name_to_node.get(name).copied().ok_or_else(|| {
      DriftError::message(format!(
        "Package '{}' not found. Workspace members: {}",
        name,
        self.members().join(", ")
      ))
    })
  }
}
