//! Integration tests for `release-train release`

use crate::helpers::{TestRepo, fake_github, github_config, run_release_train, run_release_train_raw};
use anyhow::Result;

#[test]
fn test_release_publishes_patch() -> Result<()> {
  let repo = TestRepo::new()?;
  let (api_url, server) = fake_github()?;
  repo.configure(&github_config(&api_url))?;

  let output = run_release_train(&repo.path, &["release"], &[("OAUTH", "secret")])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Release done"), "stdout: {}", stdout);

  // Layout is untouched apart from the version
  assert_eq!(
    repo.manifest()?,
    "{\n  \"name\": \"widget\",\n  \"version\": \"1.2.4\",\n  \"private\": true\n}\n"
  );
  assert_eq!(repo.head_subject()?, "Bumped version number");
  assert_eq!(repo.remote_subject()?, "Bumped version number");
  assert!(repo.remote_tags()?.contains(&"1.2.4".to_string()));

  let request = server.join().expect("fake server panicked");
  let lowered = request.to_lowercase();
  assert!(lowered.starts_with("post /repos/acme/widget/releases "), "request: {}", request);
  assert!(lowered.contains("authorization: token secret"));
  assert!(request.contains(r#""tag_name":"1.2.4""#));
  assert!(request.contains("compare/1.2.3...1.2.4"));
  assert!(request.contains("### Features"));
  assert!(request.contains("**core:** add widget factory"));
  assert!(request.contains("### Bug Fixes"));

  Ok(())
}

#[test]
fn test_release_type_flag() -> Result<()> {
  let repo = TestRepo::new()?;
  let (api_url, server) = fake_github()?;
  repo.configure(&github_config(&api_url))?;

  run_release_train(&repo.path, &["release", "--type", "minor"], &[("OAUTH", "secret")])?;
  server.join().expect("fake server panicked");

  assert!(repo.manifest()?.contains("\"version\": \"1.3.0\""));
  assert!(repo.remote_tags()?.contains(&"1.3.0".to_string()));

  Ok(())
}

#[test]
fn test_release_type_from_env() -> Result<()> {
  let repo = TestRepo::new()?;
  let (api_url, server) = fake_github()?;
  repo.configure(&github_config(&api_url))?;

  run_release_train(&repo.path, &["release"], &[("OAUTH", "secret"), ("RELEASE_TYPE", "major")])?;
  let request = server.join().expect("fake server panicked");

  assert!(repo.manifest()?.contains("\"version\": \"2.0.0\""));
  assert!(request.contains(r#""tag_name":"2.0.0""#));

  Ok(())
}

#[test]
fn test_missing_token_fails_after_tagging() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.configure(&github_config("http://127.0.0.1:9"))?;

  let output = run_release_train_raw(&repo.path, &["release"], &[])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(3), "stderr: {}", stderr);
  assert!(stderr.contains("OAUTH"), "stderr: {}", stderr);
  assert!(stderr.contains("publish"));
  assert!(!String::from_utf8_lossy(&output.stdout).contains("Release done"));

  // Steps 1-4 stay in effect
  assert!(repo.remote_tags()?.contains(&"1.2.4".to_string()));
  assert_eq!(repo.remote_subject()?, "Bumped version number");

  Ok(())
}

#[test]
fn test_push_failure_stops_before_tag() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.configure(&github_config("http://127.0.0.1:9"))?;
  let missing = repo.path.with_file_name("missing.git");
  crate::helpers::git(&repo.path, &["remote", "set-url", "origin", &missing.to_string_lossy()])?;

  let output = run_release_train_raw(&repo.path, &["release"], &[("OAUTH", "secret")])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(2), "stderr: {}", stderr);
  assert!(stderr.contains("push"), "stderr: {}", stderr);

  // The commit is kept locally, no tag was created
  assert_eq!(repo.head_subject()?, "Bumped version number");
  assert!(!repo.local_tags()?.contains(&"1.2.4".to_string()));
  assert!(repo.manifest()?.contains("\"version\": \"1.2.4\""));

  Ok(())
}

#[test]
fn test_dry_run_changes_nothing() -> Result<()> {
  let repo = TestRepo::new()?;
  let head = repo.head()?;
  let manifest = repo.manifest()?;

  let output = run_release_train(&repo.path, &["release", "--dry-run"], &[])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Dry-run"), "stdout: {}", stdout);
  assert!(stdout.contains("1.2.4"));
  assert_eq!(repo.head()?, head);
  assert_eq!(repo.manifest()?, manifest);
  assert_eq!(repo.local_tags()?, vec!["1.2.3".to_string()]);

  Ok(())
}

#[test]
fn test_existing_tag_is_rejected() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.configure(&github_config("http://127.0.0.1:9"))?;
  crate::helpers::git(&repo.path, &["tag", "1.2.4"])?;

  let output = run_release_train_raw(&repo.path, &["release"], &[("OAUTH", "secret")])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(2), "stderr: {}", stderr);
  assert!(stderr.contains("Tag '1.2.4' already exists"), "stderr: {}", stderr);

  Ok(())
}

#[test]
fn test_invalid_type_rejected() -> Result<()> {
  let repo = TestRepo::new()?;

  let output = run_release_train_raw(&repo.path, &["release", "--type", "huge"], &[])?;
  assert!(!output.status.success());
  assert!(repo.manifest()?.contains("\"version\": \"1.2.3\""));

  Ok(())
}
