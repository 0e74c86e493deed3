//! Project context - build once in main, pass to every command
//!
//! Loads the configuration and opens the git repository a single time.

use crate::core::config::ReleaseConfig;
use crate::core::error::ReleaseResult;
use crate::core::vcs::SystemGit;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone)]
pub struct ReleaseContext {
  /// Project root (absolute path); the manifest is resolved against it
  pub root: PathBuf,

  /// Validated release configuration (defaults when no release.toml exists)
  pub config: Arc<ReleaseConfig>,

  /// Git backend for the project repository
  pub git: Arc<SystemGit>,
}

impl ReleaseContext {
  pub async fn build(root: &Path) -> ReleaseResult<Self> {
    let root = std::path::absolute(root)?;
    let config = ReleaseConfig::load(&root)?;

    let git = SystemGit::open(&root).await?;
    tracing::debug!(root = %root.display(), work_tree = %git.work_tree().display(), "loaded release context");

    Ok(Self {
      root,
      config: Arc::new(config),
      git: Arc::new(git),
    })
  }
}
