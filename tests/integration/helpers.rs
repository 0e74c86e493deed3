//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::thread::JoinHandle;
use tempfile::TempDir;

/// Environment the binary must not inherit from the developer's shell
const SCRUBBED_ENV: &[&str] = &[
  "OAUTH",
  "RELEASE_TYPE",
  "RELEASE_TRAIN_LOG",
  "HTTP_PROXY",
  "HTTPS_PROXY",
  "ALL_PROXY",
  "http_proxy",
  "https_proxy",
  "all_proxy",
];

/// A project repository with one released tag and a bare `origin` remote
pub struct TestRepo {
  _root: TempDir,
  pub path: PathBuf,
  pub remote: PathBuf,
}

impl TestRepo {
  /// Create `package.json` at 1.2.3, tag it, push it, then add two unreleased commits
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("project");
    let remote = root.path().join("remote.git");
    std::fs::create_dir_all(&path)?;

    git(root.path(), &["init", "--bare", "--initial-branch=main", "remote.git"])?;

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    git(&path, &["remote", "add", "origin", &remote.to_string_lossy()])?;

    std::fs::write(
      path.join("package.json"),
      "{\n  \"name\": \"widget\",\n  \"version\": \"1.2.3\",\n  \"private\": true\n}\n",
    )?;
    let repo = Self {
      _root: root,
      path,
      remote,
    };

    repo.commit("chore: initial commit")?;
    git(&repo.path, &["tag", "-a", "1.2.3", "-m", "Created Tag for version: 1.2.3"])?;
    git(&repo.path, &["push", "origin", "main", "--tags"])?;

    std::fs::write(repo.path.join("index.js"), "module.exports = {};\n")?;
    repo.commit("feat(core): add widget factory")?;
    std::fs::write(repo.path.join("index.js"), "module.exports = { close() {} };\n")?;
    repo.commit("fix: release handles on close")?;

    Ok(repo)
  }

  /// Write release.toml and commit it
  pub fn configure(&self, toml: &str) -> Result<()> {
    std::fs::write(self.path.join("release.toml"), toml)?;
    self.commit("chore: add release config")?;
    Ok(())
  }

  /// Stage everything and commit
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;
    self.head()
  }

  pub fn head(&self) -> Result<String> {
    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Subject line of the latest commit
  pub fn head_subject(&self) -> Result<String> {
    let output = git(&self.path, &["log", "-1", "--format=%s"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  pub fn local_tags(&self) -> Result<Vec<String>> {
    let output = git(&self.path, &["tag", "--list"])?;
    Ok(lines(&output))
  }

  pub fn remote_tags(&self) -> Result<Vec<String>> {
    let output = git(&self.remote, &["tag", "--list"])?;
    Ok(lines(&output))
  }

  /// Subject line of `main` on the remote
  pub fn remote_subject(&self) -> Result<String> {
    let output = git(&self.remote, &["log", "-1", "--format=%s", "main"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  pub fn manifest(&self) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join("package.json"))?)
  }
}

fn lines(output: &Output) -> Vec<String> {
  String::from_utf8_lossy(&output.stdout)
    .lines()
    .map(String::from)
    .collect()
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run release-train and return its output whatever the exit status
pub fn run_release_train_raw(cwd: &Path, args: &[&str], env: &[(&str, &str)]) -> Result<Output> {
  let mut cmd = Command::new(env!("CARGO_BIN_EXE_release-train"));
  cmd.current_dir(cwd).args(args);
  for key in SCRUBBED_ENV {
    cmd.env_remove(key);
  }
  for (key, value) in env {
    cmd.env(key, value);
  }

  cmd.output().context("Failed to run release-train")
}

/// Run release-train and fail unless it exits successfully
pub fn run_release_train(cwd: &Path, args: &[&str], env: &[(&str, &str)]) -> Result<Output> {
  let output = run_release_train_raw(cwd, args, env)?;

  if !output.status.success() {
    anyhow::bail!(
      "release-train command failed: release-train {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      String::from_utf8_lossy(&output.stdout),
      String::from_utf8_lossy(&output.stderr)
    );
  }

  Ok(output)
}

/// Fake GitHub API answering one request with `201 Created`
///
/// Returns the base URL and a handle yielding the raw request.
pub fn fake_github() -> Result<(String, JoinHandle<String>)> {
  let listener = TcpListener::bind("127.0.0.1:0")?;
  let url = format!("http://{}", listener.local_addr()?);

  let handle = std::thread::spawn(move || {
    let Ok((mut stream, _)) = listener.accept() else {
      return String::new();
    };

    let mut request = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
      let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => break,
        Ok(n) => n,
      };
      request.extend_from_slice(&buf[..n]);
      if request_complete(&request) {
        break;
      }
    }

    let body = r#"{"id": 7, "html_url": "https://github.com/acme/widget/releases/tag/new"}"#;
    let response = format!(
      "HTTP/1.1 201 Created\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
      body.len(),
      body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();

    String::from_utf8_lossy(&request).to_string()
  });

  Ok((url, handle))
}

/// Headers received and the body as long as `content-length` says
fn request_complete(request: &[u8]) -> bool {
  let text = String::from_utf8_lossy(request);
  let Some(header_end) = text.find("\r\n\r\n") else {
    return false;
  };

  let content_length = text[..header_end]
    .lines()
    .filter_map(|line| line.split_once(':'))
    .find(|(key, _)| key.trim().eq_ignore_ascii_case("content-length"))
    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
    .unwrap_or(0);

  request.len() >= header_end + 4 + content_length
}

/// release.toml pointing the publish step at a fake API
pub fn github_config(api_url: &str) -> String {
  format!("[github]\nrepository = \"acme/widget\"\napi_url = \"{}\"\n", api_url)
}
