//! Release notes from conventional commits
//!
//! Commits between the previous tag and the new one are parsed as conventional
//! commits and rendered in the angular changelog style used on GitHub releases:
//! features, bug fixes, performance improvements and reverts, followed by breaking
//! changes. Other commit types are parsed but left out of the notes.

use crate::core::vcs::CommitInfo;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(?P<type>[A-Za-z0-9]+)(?:\((?P<scope>[^()\r\n]+)\))?(?P<bang>!)?:\s*(?P<description>.*)$")
    .expect("conventional commit header pattern is valid")
});

/// A parsed conventional commit
///
/// Format: `<type>(<scope>)!: <description>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalCommit {
  /// Commit type (feat, fix, chore, docs, etc.)
  pub commit_type: CommitType,
  /// Optional scope (e.g., "auth", "api", "core")
  pub scope: Option<String>,
  /// Short description
  pub description: String,
  /// Breaking change text; empty when only flagged with `!`
  pub breaking_change: Option<String>,
}

/// Conventional commit types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CommitType {
  Feat,
  Fix,
  Perf,
  Revert,
  Docs,
  Style,
  Refactor,
  Test,
  Build,
  Ci,
  Chore,
  Other,
}

impl CommitType {
  /// Parse commit type from string
  pub fn parse(s: &str) -> Self {
    match s.to_lowercase().as_str() {
      "feat" | "feature" => Self::Feat,
      "fix" => Self::Fix,
      "perf" | "performance" => Self::Perf,
      "revert" => Self::Revert,
      "docs" | "doc" => Self::Docs,
      "style" => Self::Style,
      "refactor" => Self::Refactor,
      "test" | "tests" => Self::Test,
      "build" => Self::Build,
      "ci" => Self::Ci,
      "chore" => Self::Chore,
      _ => Self::Other,
    }
  }

  /// Whether commits of this type get a section in the release notes
  pub fn is_published(&self) -> bool {
    matches!(self, Self::Feat | Self::Fix | Self::Perf | Self::Revert)
  }

  /// Section heading for this commit type
  pub fn display_name(&self) -> &'static str {
    match self {
      Self::Feat => "Features",
      Self::Fix => "Bug Fixes",
      Self::Perf => "Performance Improvements",
      Self::Revert => "Reverts",
      Self::Docs => "Documentation",
      Self::Style => "Styles",
      Self::Refactor => "Code Refactoring",
      Self::Test => "Tests",
      Self::Build => "Build System",
      Self::Ci => "Continuous Integration",
      Self::Chore => "Chores",
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
  /// Check if this commit is a breaking change
  pub fn is_breaking(&self) -> bool {
    self.breaking_change.is_some()
  }

  /// Parse a conventional commit from a git commit message
  ///
  /// Returns None if the message doesn't follow conventional commit format.
  pub fn parse(message: &str) -> Option<Self> {
    let (first_line, rest) = message.split_once('\n').unwrap_or((message, ""));
    let caps = HEADER.captures(first_line.trim_end())?;

    let commit_type = CommitType::parse(&caps["type"]);
    let scope = caps.name("scope").map(|m| m.as_str().trim().to_string());
    let description = caps["description"].trim().to_string();

    // Footers must come after an empty line
    let mut breaking_change = None;
    let mut seen_empty_line = false;
    for line in rest.lines() {
      let trimmed = line.trim();
      if trimmed.is_empty() {
        seen_empty_line = true;
        continue;
      }

      if seen_empty_line && let Some((key, value)) = trimmed.split_once(':') {
        let key = key.trim();
        if key.eq_ignore_ascii_case("BREAKING CHANGE") || key.eq_ignore_ascii_case("BREAKING-CHANGE") {
          breaking_change = Some(value.trim().to_string());
        }
      }
    }

    if breaking_change.is_none() && caps.name("bang").is_some() {
      breaking_change = Some(String::new());
    }

    Some(Self {
      commit_type,
      scope,
      description,
      breaking_change,
    })
  }
}

#[derive(Debug, Clone)]
struct NoteEntry {
  commit: ConventionalCommit,
  sha: String,
}

/// Release notes for one tag
#[derive(Debug, Clone)]
pub struct ReleaseNotes {
  /// Version (or tag name) shown in the heading
  pub version: String,
  /// Release date (YYYY-MM-DD)
  pub date: String,
  /// Link to the diff against the previous tag
  pub compare_url: Option<String>,
  /// Base URL that a commit SHA is appended to
  pub commit_url: Option<String>,
  entries: BTreeMap<CommitType, Vec<NoteEntry>>,
  total_commits: usize,
}

impl ReleaseNotes {
  pub fn new(version: impl Into<String>, date: impl Into<String>) -> Self {
    Self {
      version: version.into(),
      date: date.into(),
      compare_url: None,
      commit_url: None,
      entries: BTreeMap::new(),
      total_commits: 0,
    }
  }

  pub fn with_compare_url(mut self, url: impl Into<String>) -> Self {
    self.compare_url = Some(url.into());
    self
  }

  pub fn with_commit_url(mut self, url: impl Into<String>) -> Self {
    self.commit_url = Some(url.into());
    self
  }

  /// Add every commit; non-conventional messages only count toward the total
  pub fn extend_from_commits(&mut self, commits: &[CommitInfo]) {
    for commit in commits {
      self.total_commits += 1;
      if let Some(parsed) = ConventionalCommit::parse(&commit.message) {
        self.add_commit(parsed, commit.sha.clone());
      }
    }
  }

  /// Add a parsed commit
  pub fn add_commit(&mut self, commit: ConventionalCommit, sha: String) {
    self.entries.entry(commit.commit_type).or_default().push(NoteEntry { commit, sha });
  }

  /// Number of commits considered, conventional or not
  pub fn total_commits(&self) -> usize {
    self.total_commits
  }

  /// Check if any commit lands in a published section
  pub fn has_published_changes(&self) -> bool {
    self
      .entries
      .iter()
      .any(|(t, e)| !e.is_empty() && (t.is_published() || e.iter().any(|n| n.commit.is_breaking())))
  }

  /// Render as markdown
  pub fn to_markdown(&self) -> String {
    let mut output = String::new();

    match &self.compare_url {
      Some(url) => output.push_str(&format!("## [{}]({}) ({})\n\n", self.version, url, self.date)),
      None => output.push_str(&format!("## {} ({})\n\n", self.version, self.date)),
    }

    for (commit_type, entries) in &self.entries {
      if !commit_type.is_published() || entries.is_empty() {
        continue;
      }

      output.push_str(&format!("### {}\n\n", commit_type.display_name()));
      for entry in entries {
        output.push_str(&format!(
          "* {}{} {}\n",
          scope_prefix(&entry.commit),
          entry.commit.description,
          self.commit_reference(&entry.sha)
        ));
      }
      output.push('\n');
    }

    let breaking: Vec<&NoteEntry> = self
      .entries
      .values()
      .flatten()
      .filter(|e| e.commit.is_breaking())
      .collect();

    if !breaking.is_empty() {
      output.push_str("### BREAKING CHANGES\n\n");
      for entry in breaking {
        let text = match entry.commit.breaking_change.as_deref() {
          Some(text) if !text.is_empty() => text,
          _ => entry.commit.description.as_str(),
        };
        output.push_str(&format!("* {}{}\n", scope_prefix(&entry.commit), text));
      }
      output.push('\n');
    }

    output.trim_end().to_string() + "\n"
  }

  fn commit_reference(&self, sha: &str) -> String {
    let short = &sha[..sha.len().min(7)];
    match &self.commit_url {
      Some(base) => format!("([{}]({}/{}))", short, base, sha),
      None => format!("({})", short),
    }
  }
}

fn scope_prefix(commit: &ConventionalCommit) -> String {
  commit
    .scope
    .as_ref()
    .map(|s| format!("**{}:** ", s))
    .unwrap_or_default()
}
