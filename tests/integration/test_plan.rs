//! Integration tests for `release-train plan`

use crate::helpers::{TestRepo, git, run_release_train, run_release_train_raw};
use anyhow::Result;

#[test]
fn test_plan_json() -> Result<()> {
  let repo = TestRepo::new()?;
  let head = repo.head()?;

  let output = run_release_train(&repo.path, &["plan", "--type", "minor", "--json"], &[])?;
  let plan: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(plan["current_version"], "1.2.3");
  assert_eq!(plan["next_version"], "1.3.0");
  assert_eq!(plan["bump"], "minor");
  assert_eq!(plan["next_tag"], "1.3.0");
  assert_eq!(plan["latest_tag"], "1.2.3");
  assert_eq!(plan["branch"], "main");
  assert_eq!(plan["remote"], "origin");
  assert_eq!(plan["commits"], 2);
  assert_eq!(
    plan["steps"],
    serde_json::json!(["bump", "commit", "push", "tag", "publish"])
  );
  // Local bare remote is not a GitHub repository
  assert!(plan["repository"].is_null());
  assert!(plan["notes"].as_str().unwrap_or_default().contains("add widget factory"));

  assert_eq!(repo.head()?, head);
  assert!(repo.manifest()?.contains("\"version\": \"1.2.3\""));

  Ok(())
}

#[test]
fn test_plan_text() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.configure("[github]\nrepository = \"acme/widget\"\n")?;

  let output = run_release_train(&repo.path, &["plan"], &[])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Release Plan"));
  assert!(stdout.contains("1.2.3"));
  assert!(stdout.contains("1.2.4"));
  assert!(stdout.contains("acme/widget"));
  assert!(stdout.contains("https://github.com/acme/widget/compare/1.2.3...1.2.4"));

  Ok(())
}

#[test]
fn test_plan_ignores_non_release_tags() -> Result<()> {
  let repo = TestRepo::new()?;
  git(&repo.path, &["tag", "nightly"])?;
  git(&repo.path, &["tag", "docs-2024", "HEAD~1"])?;

  let output = run_release_train(&repo.path, &["plan", "--json"], &[])?;
  let plan: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(plan["latest_tag"], "1.2.3");
  assert_eq!(plan["commits"], 2);
  let notes = plan["notes"].as_str().unwrap_or_default();
  assert!(notes.contains("add widget factory"));
  assert!(notes.contains("release handles on close"));

  Ok(())
}

#[test]
fn test_plan_with_root_flag() -> Result<()> {
  let repo = TestRepo::new()?;
  let elsewhere = tempfile::TempDir::new()?;

  let root = repo.path.to_string_lossy().to_string();
  let output = run_release_train(elsewhere.path(), &["--root", &root, "plan", "--json"], &[])?;
  let plan: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(plan["next_version"], "1.2.4");

  Ok(())
}

#[test]
fn test_invalid_config_exits_with_user_error() -> Result<()> {
  let repo = TestRepo::new()?;
  std::fs::write(repo.path.join("release.toml"), "[github]\nrepository = \"not-a-slug\"\n")?;

  let output = run_release_train_raw(&repo.path, &["plan"], &[])?;
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert_eq!(output.status.code(), Some(1), "stderr: {}", stderr);
  assert!(stderr.contains("github.repository"), "stderr: {}", stderr);

  Ok(())
}

#[test]
fn test_outside_git_repo_exits_with_system_error() -> Result<()> {
  let dir = tempfile::TempDir::new()?;
  std::fs::write(dir.path().join("package.json"), "{\"version\":\"0.1.0\"}\n")?;

  let output = run_release_train_raw(dir.path(), &["plan"], &[])?;
  assert_eq!(output.status.code(), Some(2));

  Ok(())
}
