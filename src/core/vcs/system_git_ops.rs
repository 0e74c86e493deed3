//! Release operations for SystemGit (staging, commits, pushes, tags, history)

use super::system_git::SystemGit;
use super::{CommitInfo, PushOptions, VersionControl};
use crate::core::error::{GitError, ReleaseError, ReleaseResult, ResultExt};
use async_trait::async_trait;
use std::path::PathBuf;

/// Field and record separators for `git log --format`
const FIELD_SEP: char = '\u{1f}';
const RECORD_SEP: char = '\u{1e}';

#[async_trait]
impl VersionControl for SystemGit {
  async fn add(&self, paths: &[PathBuf]) -> ReleaseResult<()> {
    let mut cmd = self.git_cmd();
    cmd.args(["add", "--"]);
    if paths.is_empty() {
      cmd.arg(".");
    } else {
      cmd.args(paths);
    }

    let output = cmd.output().await.context("Failed to run git add")?;
    if !output.status.success() {
      return Err(ReleaseError::Git(GitError::CommandFailed {
        command: "git add".to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
      }));
    }

    Ok(())
  }

  async fn commit(&self, message: &str) -> ReleaseResult<()> {
    let output = self
      .git_cmd()
      .args(["commit", "-m", message])
      .output()
      .await
      .context("Failed to run git commit")?;

    if !output.status.success() {
      // "nothing to commit" is reported on stdout
      let mut reason = String::from_utf8_lossy(&output.stderr).to_string();
      if reason.trim().is_empty() {
        reason = String::from_utf8_lossy(&output.stdout).to_string();
      }
      return Err(ReleaseError::Git(GitError::CommandFailed {
        command: "git commit".to_string(),
        stderr: reason,
      }));
    }

    Ok(())
  }

  async fn push(&self, remote: &str, branch: &str, options: PushOptions) -> ReleaseResult<()> {
    let mut cmd = self.git_cmd();
    cmd.args(["push", remote, branch]);
    if options.tags {
      cmd.arg("--tags");
    }

    let output = cmd.output().await.context("Failed to push")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ReleaseError::Git(GitError::PushFailed {
        remote: remote.to_string(),
        branch: branch.to_string(),
        reason: stderr.to_string(),
      }));
    }

    Ok(())
  }

  async fn tag(&self, name: &str, message: &str) -> ReleaseResult<()> {
    let tag_ref = format!("refs/tags/{}", name);
    let exists = self
      .git_cmd()
      .args(["rev-parse", "--quiet", "--verify", &tag_ref])
      .output()
      .await
      .context("Failed to check for existing tag")?
      .status
      .success();

    if exists {
      return Err(ReleaseError::Git(GitError::TagExists { name: name.to_string() }));
    }

    self.run(&["tag", "-a", name, "-m", message]).await?;
    Ok(())
  }

  async fn current_branch(&self) -> ReleaseResult<String> {
    let branch = self.run(&["rev-parse", "--abbrev-ref", "HEAD"]).await?;
    let branch = branch.trim();

    if branch == "HEAD" {
      return Err(ReleaseError::Git(GitError::DetachedHead));
    }

    Ok(branch.to_string())
  }

  async fn merged_tags(&self, rev: &str) -> ReleaseResult<Vec<String>> {
    let output = self
      .git_cmd()
      .args(["tag", "--list", "--merged", rev, "--sort=-v:refname"])
      .output()
      .await
      .context("Failed to list tags")?;

    // No commits yet, or `<tag>^` of a root commit
    if !output.status.success() {
      tracing::debug!(rev, "revision does not resolve; no tags");
      return Ok(Vec::new());
    }

    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect(),
    )
  }

  async fn commits_between(&self, from: Option<&str>, to: &str) -> ReleaseResult<Vec<CommitInfo>> {
    let range = match from {
      Some(from) => format!("{}..{}", from, to),
      None => to.to_string(),
    };
    let format = format!("--format=%H{}%B{}", FIELD_SEP, RECORD_SEP);

    let stdout = self.run(&["log", "--no-merges", &format, &range]).await?;
    parse_log_output(&stdout)
  }

  async fn remote_url(&self, name: &str) -> ReleaseResult<Option<String>> {
    let output = self
      .git_cmd()
      .args(["remote", "get-url", name])
      .output()
      .await
      .context("Failed to read remote URL")?;

    if !output.status.success() {
      return Ok(None);
    }

    let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(if url.is_empty() { None } else { Some(url) })
  }
}

/// Parse `git log` output produced with the `%H %B` record format
fn parse_log_output(output: &str) -> ReleaseResult<Vec<CommitInfo>> {
  let mut commits = Vec::new();

  for record in output.split(RECORD_SEP) {
    let record = record.trim_start_matches(['\n', '\r']);
    if record.trim().is_empty() {
      continue;
    }

    let (sha, message) = record
      .split_once(FIELD_SEP)
      .ok_or_else(|| ReleaseError::message("Malformed git log record"))?;
    let sha = sha.trim();
    if sha.is_empty() {
      return Err(ReleaseError::message("Missing commit SHA"));
    }

    commits.push(CommitInfo {
      sha: sha.to_string(),
      message: message.trim().to_string(),
    });
  }

  Ok(commits)
}
