//! Release preview: what `release` would do, without doing it
//!
//! Everything here is read-only. The next version is computed in memory and the notes
//! cover the commits since the latest tag up to HEAD.

use crate::core::error::ReleaseResult;
use crate::core::manifest::read_version;
use crate::core::vcs::VersionControl;
use crate::release::bump::VersionBump;
use crate::release::steps::{
  ReleaseSettings, STEP_NAMES, collect_notes, latest_release_tag, resolve_branch, resolve_repository,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct ReleasePlan {
  pub manifest: PathBuf,
  pub current_version: String,
  pub next_version: String,
  pub bump: VersionBump,
  pub next_tag: String,
  /// Highest release tag reachable from HEAD
  pub latest_tag: Option<String>,
  pub remote: String,
  pub branch: String,
  /// `None` when neither config nor the remote URL names a GitHub repository
  pub repository: Option<String>,
  pub steps: Vec<&'static str>,
  pub commits: usize,
  /// Markdown body the release would be published with
  pub notes: String,
}

impl ReleasePlan {
  pub async fn build(settings: &ReleaseSettings, vcs: &dyn VersionControl) -> ReleaseResult<Self> {
    let current = read_version(&settings.manifest).await?;
    let next = settings.bump.apply(&current)?;
    let next_tag = settings.tags.name(&next);

    let branch = resolve_branch(vcs, settings.branch.as_deref()).await?;
    let latest_tag = latest_release_tag(vcs, &settings.tags, "HEAD").await?;

    // A preview still works for repositories that are not on GitHub
    let repository = match resolve_repository(vcs, settings.repository.as_ref(), &settings.remote).await {
      Ok(repo) => Some(repo),
      Err(e) => {
        tracing::debug!(error = %e, "no GitHub repository for plan");
        None
      }
    };

    let links = repository.as_ref().map(|repo| (settings.web_url.as_str(), repo));
    let notes = collect_notes(vcs, &next_tag, latest_tag.as_deref(), "HEAD", links).await?;

    Ok(Self {
      manifest: settings.manifest.clone(),
      current_version: current.to_string(),
      next_version: next.to_string(),
      bump: settings.bump,
      next_tag,
      latest_tag,
      remote: settings.remote.clone(),
      branch,
      repository: repository.map(|r| r.to_string()),
      steps: STEP_NAMES.to_vec(),
      commits: notes.total_commits(),
      notes: notes.to_markdown(),
    })
  }

  /// Print the plan in human-readable form
  pub fn print(&self) {
    println!("📦 Release Plan");
    println!();
    println!("  Manifest: {}", self.manifest.display());
    println!("  Current:  {}", self.current_version);
    println!("  Next:     {} ({})", self.next_version, self.bump);
    println!("  Tag:      {}", self.next_tag);
    match &self.latest_tag {
      Some(tag) => println!("  Previous: {}", tag),
      None => println!("  Previous: (no earlier tag)"),
    }
    println!();
    println!("  Push:     {} → {}", self.branch, self.remote);
    match &self.repository {
      Some(repo) => println!("  GitHub:   {}", repo),
      None => println!("  GitHub:   ⚠️  not resolvable (set github.repository in release.toml)"),
    }
    println!();
    println!("  Steps:");
    for (i, step) in self.steps.iter().enumerate() {
      println!("    {}. {}", i + 1, step);
    }
    println!();
    println!("📝 Release notes ({} commits):", self.commits);
    println!();
    for line in self.notes.lines() {
      println!("  {}", line);
    }
  }
}
