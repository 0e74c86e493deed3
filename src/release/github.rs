//! GitHub release creation via the REST API
//!
//! Authenticates with an OAuth token (`Authorization: token <...>`) that the caller
//! injects; this module never reads the environment.

use crate::core::error::{ReleaseError, ReleaseResult, RemoteError};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

/// `scheme://[user@]host[:port]/owner/name` or scp-style `[user@]host:owner/name`
static REMOTE_SLUG: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(?:[A-Za-z][A-Za-z0-9+.-]*://(?:[^@/]+@)?[^:/@]+(?::\d+)?/|(?:[^@/:]+@)?[^:/@]+:)(?P<owner>[A-Za-z0-9_.-]+)/(?P<name>[A-Za-z0-9_.-]+?)(?:\.git)?/?$")
    .expect("remote URL pattern is valid")
});

/// GitHub repository coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoSlug {
  pub owner: String,
  pub name: String,
}

impl RepoSlug {
  /// Parse "owner/repo"
  pub fn parse(slug: &str) -> Option<Self> {
    let (owner, name) = slug.trim().split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
      return None;
    }
    Some(Self {
      owner: owner.to_string(),
      name: name.trim_end_matches(".git").to_string(),
    })
  }

  /// Derive owner/repo from an SSH or HTTPS remote URL
  ///
  /// Local filesystem remotes are rejected; they have no hosted repository.
  pub fn from_remote_url(url: &str) -> Option<Self> {
    if is_local_remote(url) {
      return None;
    }

    let caps = REMOTE_SLUG.captures(url.trim())?;
    Some(Self {
      owner: caps["owner"].to_string(),
      name: caps["name"].to_string(),
    })
  }

  /// Browser URL of the repository on a host
  pub fn web_url(&self, host: &str) -> String {
    format!("{}/{}/{}", host.trim_end_matches('/'), self.owner, self.name)
  }
}

impl fmt::Display for RepoSlug {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.owner, self.name)
  }
}

/// Release to be created
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRelease {
  pub tag_name: String,
  pub name: String,
  pub body: String,
  pub draft: bool,
  pub prerelease: bool,
}

/// Release as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PublishedRelease {
  pub id: u64,
  pub html_url: String,
}

/// Remote release backend consumed by the publish step
#[async_trait]
pub trait ReleasePublisher: Send + Sync {
  async fn create_release(&self, repo: &RepoSlug, release: &NewRelease) -> ReleaseResult<PublishedRelease>;
}

/// GitHub REST API publisher
pub struct GitHubPublisher {
  client: Client,
  api_url: String,
  token: Option<String>,
  token_env: String,
}

impl GitHubPublisher {
  /// Create a publisher
  ///
  /// `token` is the OAuth token read by the caller from `token_env`; a missing token
  /// only fails when a release is actually created.
  pub fn new(api_url: &str, token: Option<String>, token_env: &str) -> ReleaseResult<Self> {
    let client = client_builder()
      .build()
      .map_err(|e| ReleaseError::message(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Self::with_client(client, api_url, token, token_env))
  }

  /// Create a publisher around an existing client
  pub fn with_client(client: Client, api_url: &str, token: Option<String>, token_env: &str) -> Self {
    Self {
      client,
      api_url: api_url.trim_end_matches('/').to_string(),
      token: token.filter(|t| !t.trim().is_empty()),
      token_env: token_env.to_string(),
    }
  }

  fn releases_url(&self, repo: &RepoSlug) -> String {
    format!("{}/repos/{}/{}/releases", self.api_url, repo.owner, repo.name)
  }
}

#[async_trait]
impl ReleasePublisher for GitHubPublisher {
  async fn create_release(&self, repo: &RepoSlug, release: &NewRelease) -> ReleaseResult<PublishedRelease> {
    let token = self.token.as_deref().ok_or_else(|| {
      ReleaseError::Remote(RemoteError::MissingToken {
        env: self.token_env.clone(),
      })
    })?;

    let url = self.releases_url(repo);
    tracing::debug!(%url, tag = %release.tag_name, "creating GitHub release");

    let response = self
      .client
      .post(&url)
      .header(AUTHORIZATION, format!("token {}", token))
      .header(ACCEPT, "application/vnd.github+json")
      .json(release)
      .send()
      .await?;

    match response.status() {
      status if status.is_success() => Ok(response.json::<PublishedRelease>().await?),
      status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
        let body = response.text().await.unwrap_or_default();
        Err(ReleaseError::Remote(RemoteError::Unauthorized {
          reason: format!("{} {}", status.as_u16(), api_message(&body)),
        }))
      }
      status => {
        let body = response.text().await.unwrap_or_default();
        Err(ReleaseError::Remote(RemoteError::RequestFailed {
          status: status.as_u16(),
          body: api_message(&body),
        }))
      }
    }
  }
}

fn client_builder() -> reqwest::ClientBuilder {
  Client::builder()
    .timeout(Duration::from_secs(30))
    .user_agent(concat!("release-train/", env!("CARGO_PKG_VERSION")))
}

/// Filesystem remotes: `file://` URLs, absolute or relative paths, and Windows drives
fn is_local_remote(url: &str) -> bool {
  let url = url.trim();
  if url.starts_with("file://") || url.starts_with("./") || url.starts_with("../") || url.starts_with("\\\\") {
    return true;
  }

  let bytes = url.as_bytes();
  if bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && matches!(bytes[2], b'\\' | b'/') {
    return true;
  }

  url.starts_with('/') && !url.contains('@')
}

/// Browser base URL for an API base URL
///
/// `https://api.github.com` maps to `https://github.com`; Enterprise servers serve the
/// API under `<host>/api/v3`.
pub fn web_base_url(api_url: &str) -> String {
  let api_url = api_url.trim_end_matches('/');
  if let Some(host) = api_url.strip_prefix("https://api.") {
    return format!("https://{}", host);
  }
  api_url.trim_end_matches("/api/v3").to_string()
}

/// Pull the `message` field out of a GitHub error body, or return the body as-is
fn api_message(body: &str) -> String {
  serde_json::from_str::<serde_json::Value>(body)
    .ok()
    .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
    .unwrap_or_else(|| body.trim().to_string())
}
