//! Error types for release-train with contextual messages and exit codes
//!
//! Errors are grouped the way a release fails in practice: the manifest could not be
//! read or rewritten, a git operation failed, or the remote release could not be
//! created. Every group carries an exit code and, where it helps, a suggestion.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for release-train
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, manifest, invalid args)
  User = 1,
  /// System error (git, I/O)
  System = 2,
  /// Remote release error (auth, network, API)
  Remote = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

impl From<ExitCode> for std::process::ExitCode {
  fn from(code: ExitCode) -> Self {
    std::process::ExitCode::from(code as u8)
  }
}

/// Main error type for release-train
#[derive(Debug)]
pub enum ReleaseError {
  /// Configuration errors
  Config(ConfigError),

  /// Manifest read/parse/write errors
  Manifest(ManifestError),

  /// Git operation errors
  Git(GitError),

  /// Remote release errors
  Remote(RemoteError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  ///
  /// Typed errors keep their variant so exit codes stay accurate. I/O errors stay
  /// I/O errors with the context folded into their message.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ReleaseError::Io(err) => ReleaseError::Io(io::Error::new(err.kind(), format!("{}: {}", ctx_str, err))),
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::Config(_) => ExitCode::User,
      ReleaseError::Manifest(_) => ExitCode::User,
      ReleaseError::Git(_) => ExitCode::System,
      ReleaseError::Remote(_) => ExitCode::Remote,
      ReleaseError::Io(_) => ExitCode::System,
      ReleaseError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Manifest(e) => e.help_message(),
      ReleaseError::Git(e) => e.help_message(),
      ReleaseError::Remote(e) => e.help_message(),
      ReleaseError::Message { help, .. } => help.clone(),
      ReleaseError::Io(_) => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Manifest(e) => write!(f, "{}", e),
      ReleaseError::Git(e) => write!(f, "{}", e),
      ReleaseError::Remote(e) => write!(f, "{}", e),
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<String> for ReleaseError {
  fn from(msg: String) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<&str> for ReleaseError {
  fn from(msg: &str) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<ConfigError> for ReleaseError {
  fn from(err: ConfigError) -> Self {
    ReleaseError::Config(err)
  }
}

impl From<ManifestError> for ReleaseError {
  fn from(err: ManifestError) -> Self {
    ReleaseError::Manifest(err)
  }
}

impl From<GitError> for ReleaseError {
  fn from(err: GitError) -> Self {
    ReleaseError::Git(err)
  }
}

impl From<RemoteError> for ReleaseError {
  fn from(err: RemoteError) -> Self {
    ReleaseError::Remote(err)
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for ReleaseError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    ReleaseError::message(format!("UTF-8 conversion error: {}", err))
  }
}

impl From<reqwest::Error> for ReleaseError {
  fn from(err: reqwest::Error) -> Self {
    ReleaseError::Remote(RemoteError::Network {
      reason: err.to_string(),
    })
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Config file exists but could not be parsed
  Parse { path: PathBuf, reason: String },

  /// A field holds a value that cannot be used
  InvalidField { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::Parse { .. } => {
        Some("Check release.toml against the documented fields: manifest, [git], [github].".to_string())
      }
      ConfigError::InvalidField { field, .. } if field == "github.repository" => {
        Some("Use the form \"owner/repo\", e.g. repository = \"acme/widget\".".to_string())
      }
      ConfigError::InvalidField { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::Parse { path, reason } => {
        write!(f, "Failed to parse config {}: {}", path.display(), reason)
      }
      ConfigError::InvalidField { field, reason } => {
        write!(f, "Invalid config field '{}': {}", field, reason)
      }
    }
  }
}

/// Manifest errors
#[derive(Debug)]
pub enum ManifestError {
  /// Manifest file does not exist
  NotFound { path: PathBuf },

  /// Manifest is not valid JSON/TOML
  Parse { path: PathBuf, reason: String },

  /// Manifest has no version field
  MissingVersion { path: PathBuf },

  /// Version field is not a semantic version
  InvalidVersion {
    path: PathBuf,
    value: String,
    reason: String,
  },

  /// Incrementing the version would overflow a component
  VersionOverflow { value: String, bump: &'static str },

  /// Manifest could not be written back
  Write { path: PathBuf, reason: String },
}

impl ManifestError {
  fn help_message(&self) -> Option<String> {
    match self {
      ManifestError::NotFound { .. } => {
        Some("Set `manifest = \"path/to/package.json\"` in release.toml or run from the project root.".to_string())
      }
      ManifestError::MissingVersion { .. } => Some("Add a version field, e.g. \"version\": \"0.1.0\".".to_string()),
      ManifestError::InvalidVersion { .. } => Some("Versions must be MAJOR.MINOR.PATCH, e.g. 1.2.3.".to_string()),
      ManifestError::VersionOverflow { .. } => Some(format!("Version components cannot exceed {}.", u64::MAX)),
      _ => None,
    }
  }
}

impl fmt::Display for ManifestError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ManifestError::NotFound { path } => write!(f, "Manifest not found: {}", path.display()),
      ManifestError::Parse { path, reason } => {
        write!(f, "Failed to parse manifest {}: {}", path.display(), reason)
      }
      ManifestError::MissingVersion { path } => {
        write!(f, "Manifest {} has no version field", path.display())
      }
      ManifestError::InvalidVersion { path, value, reason } => {
        write!(f, "Invalid version '{}' in {}: {}", value, path.display(), reason)
      }
      ManifestError::VersionOverflow { value, bump } => {
        write!(f, "Cannot apply a {} bump to '{}': the component would overflow", bump, value)
      }
      ManifestError::Write { path, reason } => {
        write!(f, "Failed to write manifest {}: {}", path.display(), reason)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Push failed
  PushFailed {
    remote: String,
    branch: String,
    reason: String,
  },

  /// Tag already exists
  TagExists { name: String },

  /// HEAD is not on a branch
  DetachedHead,
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") || reason.contains("rejected") {
          Some("The remote has commits you don't have. Pull first, then re-run the release.".to_string())
        } else if reason.contains("ermission denied") || reason.contains("403") {
          Some("Check your SSH key or credentials for the remote.".to_string())
        } else if reason.contains("does not appear to be a git repository") {
          Some("Check `git.remote` in release.toml against `git remote -v`.".to_string())
        } else {
          None
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Initialize the repository first or check the path: {}",
        path.display()
      )),
      GitError::TagExists { name } => Some(format!(
        "Delete it with `git tag -d {}` if it was created by a failed release.",
        name
      )),
      GitError::DetachedHead => Some("Check out a branch or set `git.branch` in release.toml.".to_string()),
      GitError::CommandFailed { .. } => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr.trim_end())
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::PushFailed { remote, branch, reason } => {
        write!(f, "Push to {}/{} failed: {}", remote, branch, reason.trim_end())
      }
      GitError::TagExists { name } => write!(f, "Tag '{}' already exists", name),
      GitError::DetachedHead => write!(f, "HEAD is detached; cannot determine the branch to push"),
    }
  }
}

/// Remote release errors
#[derive(Debug)]
pub enum RemoteError {
  /// Auth token not present in the environment
  MissingToken { env: String },

  /// Token rejected by the API
  Unauthorized { reason: String },

  /// API answered with a non-success status
  RequestFailed { status: u16, body: String },

  /// Transport failure
  Network { reason: String },

  /// Repository owner/name could not be derived
  UnknownRepository { remote: String },
}

impl RemoteError {
  fn help_message(&self) -> Option<String> {
    match self {
      RemoteError::MissingToken { env } => Some(format!(
        "Export a GitHub token with `repo` scope: export {}=<token>",
        env
      )),
      RemoteError::Unauthorized { .. } => {
        Some("The token was rejected. Check that it is valid and has `repo` scope.".to_string())
      }
      RemoteError::RequestFailed { status: 422, .. } => {
        Some("GitHub rejected the release. A release for this tag may already exist.".to_string())
      }
      RemoteError::UnknownRepository { .. } => {
        Some("Set `github.repository = \"owner/repo\"` in release.toml.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for RemoteError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RemoteError::MissingToken { env } => {
        write!(f, "No release token found: environment variable {} is not set", env)
      }
      RemoteError::Unauthorized { reason } => write!(f, "Release API rejected credentials: {}", reason),
      RemoteError::RequestFailed { status, body } => {
        write!(f, "Release API request failed with status {}: {}", status, body)
      }
      RemoteError::Network { reason } => write!(f, "Release API unreachable: {}", reason),
      RemoteError::UnknownRepository { remote } => {
        write!(f, "Cannot derive a GitHub repository from remote '{}'", remote)
      }
    }
  }
}

/// Result type alias for release-train
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_exit_codes_by_group() {
    let manifest = ReleaseError::from(ManifestError::MissingVersion {
      path: "package.json".into(),
    });
    let git = ReleaseError::from(GitError::DetachedHead);
    let remote = ReleaseError::from(RemoteError::MissingToken { env: "OAUTH".into() });

    assert_eq!(manifest.exit_code(), ExitCode::User);
    assert_eq!(git.exit_code(), ExitCode::System);
    assert_eq!(remote.exit_code(), ExitCode::Remote);
  }

  #[test]
  fn test_context_keeps_typed_variant() {
    let err = ReleaseError::from(GitError::DetachedHead).context("while pushing");
    assert!(matches!(err, ReleaseError::Git(GitError::DetachedHead)));
  }

  #[test]
  fn test_context_wraps_io_error() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
    let err = ReleaseError::from(io_err).context("Failed to execute git");
    assert_eq!(err.to_string(), "I/O error: Failed to execute git: gone");
    assert_eq!(err.exit_code(), ExitCode::System);
  }

  #[test]
  fn test_missing_token_help_names_variable() {
    let err = ReleaseError::from(RemoteError::MissingToken { env: "OAUTH".into() });
    assert!(err.help_message().unwrap().contains("export OAUTH="));
  }
}
