//! Conventional-commit release notes
//!
//! The changelog windower hands each release range to a [`ChangelogFormatter`]
//! and concatenates the results; [`ConventionalNotes`] is the built-in
//! formatter. It parses `type(scope): description` subjects, groups them by
//! type, and renders one markdown section per range.

use crate::core::error::DriftResult;
use crate::core::vcs::{Git, ReleaseRange};
use crate::graph::workspace_graph::{PackageNode, WorkspaceGraph};
use semver::Version;
use std::collections::BTreeMap;
use std::fmt;

/// Produces the markdown for one release range of one package.
///
/// Implementations own version inference for unreleased ranges; the caller
/// supplies only the commit boundaries.
pub trait ChangelogFormatter {
  fn format(&self, package: &PackageNode, range: &ReleaseRange) -> DriftResult<String>;
}

/// A parsed conventional commit subject: `<type>(<scope>)!: <description>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalCommit {
  pub commit_type: CommitType,
  pub scope: Option<String>,
  pub description: String,
  pub breaking: bool,
}

/// Conventional commit types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CommitType {
  Feat,
  Fix,
  Perf,
  Docs,
  Refactor,
  Test,
  Build,
  Ci,
  Chore,
  Style,
  Revert,
  Other,
}

impl CommitType {
  pub fn parse(s: &str) -> Self {
    match s.to_lowercase().as_str() {
      "feat" | "feature" => Self::Feat,
      "fix" => Self::Fix,
      "perf" | "performance" => Self::Perf,
      "docs" | "doc" => Self::Docs,
      "refactor" => Self::Refactor,
      "test" | "tests" => Self::Test,
      "build" => Self::Build,
      "ci" => Self::Ci,
      "chore" => Self::Chore,
      "style" => Self::Style,
      "revert" => Self::Revert,
      _ => Self::Other,
    }
  }

  pub fn display_name(&self) -> &'static str {
    match self {
      Self::Feat => "Features",
      Self::Fix => "Bug Fixes",
      Self::Perf => "Performance",
      Self::Docs => "Documentation",
      Self::Refactor => "Refactoring",
      Self::Test => "Tests",
      Self::Build => "Build",
      Self::Ci => "CI",
      Self::Chore => "Chores",
      Self::Style => "Style",
      Self::Revert => "Reverts",
      Self::Other => "Other",
    }
  }
}

impl fmt::Display for CommitType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.display_name())
  }
}

impl ConventionalCommit {
  /// Parse a commit subject line.
  ///
  /// Returns None when the subject doesn't follow the conventional format.
  /// This is intentional - not all commits need to be conventional, and
  /// non-conventional ones are simply left out of the notes.
  pub fn parse(subject: &str) -> Option<Self> {
    let (header, description) = subject.split_once(':')?;
    let description = description.trim();
    if description.is_empty() {
      return None;
    }

    let (header, breaking) = match header.strip_suffix('!') {
      Some(h) => (h, true),
      None => (header, false),
    };

    let (type_str, scope) = match header.split_once('(') {
      Some((t, rest)) => {
        let scope = rest.strip_suffix(')')?;
        if scope.is_empty() {
          return None;
        }
        (t, Some(scope.to_string()))
      }
      None => (header, None),
    };

    if type_str.is_empty() || !type_str.chars().all(|c| c.is_ascii_alphanumeric()) {
      return None;
    }

    Some(Self {
      commit_type: CommitType::parse(type_str),
      scope,
      description: description.to_string(),
      breaking,
    })
  }
}

/// Built-in conventional-commit formatter.
pub struct ConventionalNotes<'a> {
  git: &'a Git,
  graph: &'a WorkspaceGraph,
}

impl<'a> ConventionalNotes<'a> {
  pub fn new(git: &'a Git, graph: &'a WorkspaceGraph) -> Self {
    Self { git, graph }
  }

  /// The version heading for a range.
  ///
  /// Tagged ranges report the tag's version. An unreleased range with commits
  /// infers the next version (breaking → major, feat → minor, otherwise
  /// patch) from the last released version, falling back to the declared
  /// manifest version when the package has no parseable tags. Without
  /// commits, or before the first release, the declared version is reported
  /// unchanged.
  fn version_label(
    &self,
    package: &PackageNode,
    range: &ReleaseRange,
    commits: &[ConventionalCommit],
  ) -> DriftResult<String> {
    if let Some(tag) = &range.tag {
      return Ok(tag.split_once('@').map(|(_, v)| v.to_string()).unwrap_or_else(|| tag.clone()));
    }

    let declared = package.version.clone();
    if range.from.is_none() || commits.is_empty() {
      return Ok(declared);
    }

    let released = super::changelog::release_tags(self.git, package, self.graph)?
      .into_iter()
      .next()
      .map(|(version, _)| version);

    Ok(match released.or_else(|| declared.parse::<Version>().ok()) {
      Some(version) => next_version(&version, commits).to_string(),
      None => declared,
    })
  }

  fn date_label(&self, range: &ReleaseRange) -> DriftResult<String> {
    if range.tag.is_some() {
      self.git.commit_date(&range.to, self.graph.root())
    } else {
      Ok(chrono::Local::now().format("%Y-%m-%d").to_string())
    }
  }
}

impl ChangelogFormatter for ConventionalNotes<'_> {
  fn format(&self, package: &PackageNode, range: &ReleaseRange) -> DriftResult<String> {
    let paths = super::changelog::scope_paths(self.graph, package)?;
    let shas = self.git.commits_in_range(range, &paths, self.graph.root())?;

    let mut commits = Vec::new();
    for sha in &shas {
      let subject = self.git.commit_subject(sha, self.graph.root())?;
      if let Some(commit) = ConventionalCommit::parse(&subject) {
        commits.push(commit);
      }
    }

    let version = self.version_label(package, range, &commits)?;
    let date = self.date_label(range)?;

    Ok(render_markdown(&version, &date, &commits))
  }
}

/// Next version after `base` given the commits since it.
fn next_version(base: &Version, commits: &[ConventionalCommit]) -> Version {
  let breaking = commits.iter().any(|c| c.breaking);
  let feat = commits.iter().any(|c| c.commit_type == CommitType::Feat);

  let mut next = Version::new(base.major, base.minor, base.patch);
  if breaking {
    next.major += 1;
    next.minor = 0;
    next.patch = 0;
  } else if feat {
    next.minor += 1;
    next.patch = 0;
  } else {
    next.patch += 1;
  }
  next
}

/// Render one release section.
fn render_markdown(version: &str, date: &str, commits: &[ConventionalCommit]) -> String {
  let mut grouped: BTreeMap<CommitType, Vec<&ConventionalCommit>> = BTreeMap::new();
  for commit in commits {
    grouped.entry(commit.commit_type).or_default().push(commit);
  }

  let mut output = String::new();
  output.push_str(&format!("## [{}] - {}\n\n", version, date));

  let ordered_types = [
    CommitType::Feat,
    CommitType::Fix,
    CommitType::Perf,
    CommitType::Docs,
    CommitType::Refactor,
    CommitType::Test,
    CommitType::Build,
    CommitType::Ci,
    CommitType::Chore,
    CommitType::Style,
    CommitType::Revert,
    CommitType::Other,
  ];

  for commit_type in &ordered_types {
    let Some(entries) = grouped.get(commit_type) else {
      continue;
    };

    output.push_str(&format!("### {}\n\n", commit_type.display_name()));

    for commit in entries {
      let scope_str = commit
        .scope
        .as_ref()
        .map(|s| format!("**{}**: ", s))
        .unwrap_or_default();

      output.push_str(&format!("* {}{}\n", scope_str, commit.description));

      if commit.breaking {
        output.push_str("  * **BREAKING CHANGE**\n");
      }
    }

    output.push('\n');
  }

  output
}
