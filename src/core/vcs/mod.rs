pub mod system_git;
mod system_git_ops;

pub use system_git::SystemGit;

use crate::core::error::ReleaseResult;
use async_trait::async_trait;
use std::path::PathBuf;

/// Information about a commit
#[derive(Debug, Clone)]
pub struct CommitInfo {
  pub sha: String,
  /// Full message: subject, body and footers
  pub message: String,
}

/// Extra behavior for a push
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushOptions {
  /// Also push all tags (`--tags`)
  pub tags: bool,
}

impl PushOptions {
  pub fn with_tags() -> Self {
    Self { tags: true }
  }
}

/// Version-control operations the release steps depend on
///
/// Every operation either completes or returns the backend's error unchanged.
#[async_trait]
pub trait VersionControl: Send + Sync {
  /// Stage paths (relative to the repository root)
  async fn add(&self, paths: &[PathBuf]) -> ReleaseResult<()>;

  /// Commit staged changes
  async fn commit(&self, message: &str) -> ReleaseResult<()>;

  /// Push a branch to a remote
  async fn push(&self, remote: &str, branch: &str, options: PushOptions) -> ReleaseResult<()>;

  /// Create an annotated tag at HEAD
  async fn tag(&self, name: &str, message: &str) -> ReleaseResult<()>;

  /// Branch HEAD points at
  async fn current_branch(&self) -> ReleaseResult<String>;

  /// Every tag reachable from `rev`; empty when `rev` does not resolve
  async fn merged_tags(&self, rev: &str) -> ReleaseResult<Vec<String>>;

  /// Commits in `from..to` (or everything reachable from `to`), newest first
  async fn commits_between(&self, from: Option<&str>, to: &str) -> ReleaseResult<Vec<CommitInfo>>;

  /// URL configured for a remote
  async fn remote_url(&self, name: &str) -> ReleaseResult<Option<String>>;
}
