use crate::core::error::{ConfigError, ReleaseError, ReleaseResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for release-train
/// Searched in order: release.toml, .release.toml, .config/release.toml
///
/// Every field has a default, so a project without a config file releases
/// `package.json` to `origin` on the current branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
  /// Version-bearing manifest, relative to the project root
  #[serde(default = "default_manifest")]
  pub manifest: PathBuf,
  #[serde(default)]
  pub git: GitConfig,
  #[serde(default)]
  pub github: GitHubConfig,
}

fn default_manifest() -> PathBuf {
  PathBuf::from("package.json")
}

/// Version-control settings for the commit/push/tag steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
  /// Remote to push the branch and tags to (default: "origin")
  #[serde(default = "default_remote")]
  pub remote: String,

  /// Branch to push (default: the current branch)
  #[serde(default)]
  pub branch: Option<String>,

  /// Message for the version bump commit
  #[serde(default = "default_commit_message")]
  pub commit_message: String,

  /// Prepended to the version to form the tag name (default: none, tag is "1.2.3")
  #[serde(default)]
  pub tag_prefix: String,

  /// Annotated tag message; `{version}` is replaced with the new version
  #[serde(default = "default_tag_message")]
  pub tag_message: String,
}

fn default_remote() -> String {
  "origin".to_string()
}

fn default_commit_message() -> String {
  "Bumped version number".to_string()
}

fn default_tag_message() -> String {
  "Created Tag for version: {version}".to_string()
}

impl Default for GitConfig {
  fn default() -> Self {
    Self {
      remote: default_remote(),
      branch: None,
      commit_message: default_commit_message(),
      tag_prefix: String::new(),
      tag_message: default_tag_message(),
    }
  }
}

/// GitHub release settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
  /// "owner/repo" (default: derived from the push remote URL)
  #[serde(default)]
  pub repository: Option<String>,

  /// API base URL; override for GitHub Enterprise
  #[serde(default = "default_api_url")]
  pub api_url: String,

  /// Environment variable holding the OAuth token
  #[serde(default = "default_token_env")]
  pub token_env: String,

  /// Create the release as a draft
  #[serde(default)]
  pub draft: bool,
}

fn default_api_url() -> String {
  "https://api.github.com".to_string()
}

fn default_token_env() -> String {
  "OAUTH".to_string()
}

impl Default for GitHubConfig {
  fn default() -> Self {
    Self {
      repository: None,
      api_url: default_api_url(),
      token_env: default_token_env(),
      draft: false,
    }
  }
}

impl Default for ReleaseConfig {
  fn default() -> Self {
    Self {
      manifest: default_manifest(),
      git: GitConfig::default(),
      github: GitHubConfig::default(),
    }
  }
}

impl ReleaseConfig {
  /// Find config file in search order: release.toml, .release.toml, .config/release.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = [
      path.join("release.toml"),
      path.join(".release.toml"),
      path.join(".config").join("release.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from the project root, falling back to defaults when no file exists
  pub fn load(path: &Path) -> ReleaseResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      tracing::debug!(root = %path.display(), "no release.toml found, using defaults");
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: ReleaseConfig = toml_edit::de::from_str(&content).map_err(|e| {
      ReleaseError::Config(ConfigError::Parse {
        path: config_path.clone(),
        reason: e.to_string(),
      })
    })?;

    config.validate()?;
    tracing::debug!(path = %config_path.display(), "loaded release config");

    Ok(config)
  }

  /// Validate field values that serde cannot check
  pub fn validate(&self) -> ReleaseResult<()> {
    if self.manifest.as_os_str().is_empty() {
      return Err(invalid("manifest", "must not be empty"));
    }

    if self.git.remote.trim().is_empty() {
      return Err(invalid("git.remote", "must not be empty"));
    }

    if let Some(ref branch) = self.git.branch
      && branch.trim().is_empty()
    {
      return Err(invalid("git.branch", "must not be empty when set"));
    }

    if self.git.commit_message.trim().is_empty() {
      return Err(invalid("git.commit_message", "must not be empty"));
    }

    if let Some(ref repository) = self.github.repository {
      let mut parts = repository.split('/');
      let valid = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
      );
      if !valid {
        return Err(invalid(
          "github.repository",
          &format!("'{}' is not of the form owner/repo", repository),
        ));
      }
    }

    if !self.github.api_url.starts_with("http://") && !self.github.api_url.starts_with("https://") {
      return Err(invalid("github.api_url", "must be an http(s) URL"));
    }

    if self.github.token_env.trim().is_empty() {
      return Err(invalid("github.token_env", "must not be empty"));
    }

    Ok(())
  }

  /// Absolute manifest path for a project root
  pub fn manifest_path(&self, root: &Path) -> PathBuf {
    root.join(&self.manifest)
  }
}

fn invalid(field: &str, reason: &str) -> ReleaseError {
  ReleaseError::Config(ConfigError::InvalidField {
    field: field.to_string(),
    reason: reason.to_string(),
  })
}
