//! The five release steps: bump, commit, push, tag, publish
//!
//! Every step receives its configuration at construction. Nothing here reads the
//! environment; the version is always re-read from the manifest on disk.

use crate::core::config::ReleaseConfig;
use crate::core::error::{ReleaseError, ReleaseResult, RemoteError};
use crate::core::manifest::{bump_manifest, read_version};
use crate::core::vcs::{PushOptions, VersionControl};
use crate::release::bump::VersionBump;
use crate::release::github::{NewRelease, ReleasePublisher, RepoSlug, web_base_url};
use crate::release::notes::ReleaseNotes;
use crate::release::pipeline::Step;
use crate::release::tags::TagFormat;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolved settings the release steps are built from
#[derive(Debug, Clone)]
pub struct ReleaseSettings {
  pub bump: VersionBump,
  /// Absolute manifest path
  pub manifest: PathBuf,
  pub remote: String,
  /// Branch to push; `None` means the current branch
  pub branch: Option<String>,
  pub commit_message: String,
  pub tags: TagFormat,
  /// Explicit GitHub repository; `None` derives it from the remote URL
  pub repository: Option<RepoSlug>,
  /// Browser base URL used for compare and commit links
  pub web_url: String,
  pub draft: bool,
}

impl ReleaseSettings {
  /// Resolve settings from a validated config
  pub fn from_config(config: &ReleaseConfig, root: &Path, bump: VersionBump) -> ReleaseResult<Self> {
    let repository = match config.github.repository.as_deref() {
      Some(slug) => Some(RepoSlug::parse(slug).ok_or_else(|| {
        ReleaseError::Remote(RemoteError::UnknownRepository {
          remote: slug.to_string(),
        })
      })?),
      None => None,
    };

    Ok(Self {
      bump,
      manifest: config.manifest_path(root),
      remote: config.git.remote.clone(),
      branch: config.git.branch.clone(),
      commit_message: config.git.commit_message.clone(),
      tags: TagFormat::new(&config.git.tag_prefix, &config.git.tag_message),
      repository,
      web_url: web_base_url(&config.github.api_url),
      draft: config.github.draft,
    })
  }
}

/// Names of the release steps, in execution order
pub const STEP_NAMES: [&str; 5] = ["bump", "commit", "push", "tag", "publish"];

/// Build the fixed release sequence: bump, commit, push, tag, publish
pub fn release_steps(
  settings: &ReleaseSettings,
  vcs: Arc<dyn VersionControl>,
  publisher: Arc<dyn ReleasePublisher>,
) -> Vec<Box<dyn Step>> {
  vec![
    Box::new(BumpVersion {
      manifest: settings.manifest.clone(),
      bump: settings.bump,
    }),
    Box::new(CommitChanges {
      vcs: Arc::clone(&vcs),
      message: settings.commit_message.clone(),
    }),
    Box::new(PushChanges {
      vcs: Arc::clone(&vcs),
      remote: settings.remote.clone(),
      branch: settings.branch.clone(),
    }),
    Box::new(CreateTag {
      vcs: Arc::clone(&vcs),
      manifest: settings.manifest.clone(),
      tags: settings.tags.clone(),
      remote: settings.remote.clone(),
      branch: settings.branch.clone(),
    }),
    Box::new(PublishRelease {
      vcs,
      publisher,
      manifest: settings.manifest.clone(),
      tags: settings.tags.clone(),
      repository: settings.repository.clone(),
      web_url: settings.web_url.clone(),
      remote: settings.remote.clone(),
      draft: settings.draft,
    }),
  ]
}

/// Configured branch, or the one HEAD points at
pub async fn resolve_branch(vcs: &dyn VersionControl, configured: Option<&str>) -> ReleaseResult<String> {
  match configured {
    Some(branch) => Ok(branch.to_string()),
    None => vcs.current_branch().await,
  }
}

/// Configured repository, or the one the remote URL points at
pub async fn resolve_repository(
  vcs: &dyn VersionControl,
  configured: Option<&RepoSlug>,
  remote: &str,
) -> ReleaseResult<RepoSlug> {
  if let Some(repo) = configured {
    return Ok(repo.clone());
  }

  let url = vcs.remote_url(remote).await?;
  url
    .as_deref()
    .and_then(RepoSlug::from_remote_url)
    .ok_or_else(|| {
      ReleaseError::Remote(RemoteError::UnknownRepository {
        remote: url.unwrap_or_else(|| remote.to_string()),
      })
    })
}

/// Highest release tag reachable from `rev`, skipping tags that are not releases
pub async fn latest_release_tag(
  vcs: &dyn VersionControl,
  tags: &TagFormat,
  rev: &str,
) -> ReleaseResult<Option<String>> {
  let merged = vcs.merged_tags(rev).await?;
  Ok(tags.latest(merged.iter().map(String::as_str)).map(str::to_string))
}

/// Release notes for the commits in `from..to`
pub async fn collect_notes(
  vcs: &dyn VersionControl,
  heading: &str,
  from: Option<&str>,
  to: &str,
  links: Option<(&str, &RepoSlug)>,
) -> ReleaseResult<ReleaseNotes> {
  let commits = vcs.commits_between(from, to).await?;
  let date = chrono::Utc::now().format("%Y-%m-%d").to_string();

  let mut notes = ReleaseNotes::new(heading, date);
  if let Some((web_url, repo)) = links {
    let repo_url = repo.web_url(web_url);
    if let Some(from) = from {
      notes = notes.with_compare_url(format!("{}/compare/{}...{}", repo_url, from, heading));
    }
    notes = notes.with_commit_url(format!("{}/commit", repo_url));
  }
  notes.extend_from_commits(&commits);

  tracing::debug!(from = ?from, to, commits = notes.total_commits(), "collected release notes");
  Ok(notes)
}

/// 1. Increment the manifest version
pub struct BumpVersion {
  pub manifest: PathBuf,
  pub bump: VersionBump,
}

#[async_trait]
impl Step for BumpVersion {
  fn name(&self) -> &'static str {
    "bump"
  }

  fn description(&self) -> String {
    format!("Bumping {} version in {}", self.bump, self.manifest.display())
  }

  async fn run(&self) -> ReleaseResult<()> {
    let (old, new) = bump_manifest(&self.manifest, self.bump).await?;
    println!("   📦 {} → {}", old, new);
    Ok(())
  }
}

/// 2. Stage everything and commit
pub struct CommitChanges {
  pub vcs: Arc<dyn VersionControl>,
  pub message: String,
}

#[async_trait]
impl Step for CommitChanges {
  fn name(&self) -> &'static str {
    "commit"
  }

  fn description(&self) -> String {
    format!("Committing changes: \"{}\"", self.message)
  }

  async fn run(&self) -> ReleaseResult<()> {
    self.vcs.add(&[PathBuf::from(".")]).await?;
    self.vcs.commit(&self.message).await?;
    println!("   ✅ Committed");
    Ok(())
  }
}

/// 3. Push the branch
pub struct PushChanges {
  pub vcs: Arc<dyn VersionControl>,
  pub remote: String,
  pub branch: Option<String>,
}

#[async_trait]
impl Step for PushChanges {
  fn name(&self) -> &'static str {
    "push"
  }

  fn description(&self) -> String {
    format!("Pushing to {}", self.remote)
  }

  async fn run(&self) -> ReleaseResult<()> {
    let branch = resolve_branch(self.vcs.as_ref(), self.branch.as_deref()).await?;
    self.vcs.push(&self.remote, &branch, PushOptions::default()).await?;
    println!("   🚀 Pushed {} to {}", branch, self.remote);
    Ok(())
  }
}

/// 4. Tag the new version and push tags
pub struct CreateTag {
  pub vcs: Arc<dyn VersionControl>,
  pub manifest: PathBuf,
  pub tags: TagFormat,
  pub remote: String,
  pub branch: Option<String>,
}

#[async_trait]
impl Step for CreateTag {
  fn name(&self) -> &'static str {
    "tag"
  }

  fn description(&self) -> String {
    "Tagging release".to_string()
  }

  async fn run(&self) -> ReleaseResult<()> {
    let version = read_version(&self.manifest).await?;
    let tag = self.tags.name(&version);

    self.vcs.tag(&tag, &self.tags.message(&version)).await?;
    println!("   🏷️  Created tag {}", tag);

    let branch = resolve_branch(self.vcs.as_ref(), self.branch.as_deref()).await?;
    self.vcs.push(&self.remote, &branch, PushOptions::with_tags()).await?;
    println!("   🚀 Pushed tags to {}", self.remote);
    Ok(())
  }
}

/// 5. Create the GitHub release from the commits since the previous tag
pub struct PublishRelease {
  pub vcs: Arc<dyn VersionControl>,
  pub publisher: Arc<dyn ReleasePublisher>,
  pub manifest: PathBuf,
  pub tags: TagFormat,
  pub repository: Option<RepoSlug>,
  pub web_url: String,
  pub remote: String,
  pub draft: bool,
}

#[async_trait]
impl Step for PublishRelease {
  fn name(&self) -> &'static str {
    "publish"
  }

  fn description(&self) -> String {
    "Publishing GitHub release".to_string()
  }

  async fn run(&self) -> ReleaseResult<()> {
    let version = read_version(&self.manifest).await?;
    let tag = self.tags.name(&version);
    let repo = resolve_repository(self.vcs.as_ref(), self.repository.as_ref(), &self.remote).await?;

    let previous = latest_release_tag(self.vcs.as_ref(), &self.tags, &format!("{}^", tag)).await?;
    let notes = collect_notes(
      self.vcs.as_ref(),
      &tag,
      previous.as_deref(),
      &tag,
      Some((self.web_url.as_str(), &repo)),
    )
    .await?;
    if !notes.has_published_changes() {
      tracing::warn!(tag = %tag, previous = ?previous, "no features, fixes or breaking changes in this release");
      println!("   ⚠️  No features or fixes since {}", previous.as_deref().unwrap_or("the first commit"));
    }

    let release = NewRelease {
      tag_name: tag.clone(),
      name: tag,
      body: notes.to_markdown(),
      draft: self.draft,
      prerelease: !version.pre.is_empty(),
    };

    let published = self.publisher.create_release(&repo, &release).await?;
    println!("   🎉 Published {} ({} commits)", published.html_url, notes.total_commits());
    Ok(())
  }
}
