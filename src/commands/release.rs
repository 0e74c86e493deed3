//! Release command implementation

use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::release::{GitHubPublisher, Pipeline, ReleasePlan, ReleaseSettings, VersionBump, release_steps};
use std::process::ExitCode;
use std::sync::Arc;

/// Run the release pipeline: bump, commit, push, tag, publish
pub async fn run_release(
  ctx: &ReleaseContext,
  bump: VersionBump,
  dry_run: bool,
  progress: bool,
) -> ReleaseResult<ExitCode> {
  let settings = ReleaseSettings::from_config(&ctx.config, &ctx.root, bump)?;

  if dry_run {
    let plan = ReleasePlan::build(&settings, ctx.git.as_ref()).await?;
    plan.print();
    println!();
    println!("🔍 Dry-run mode (no changes applied)");
    return Ok(ExitCode::SUCCESS);
  }

  // The token is injected here; no step reads the environment
  let github = &ctx.config.github;
  let token = std::env::var(&github.token_env).ok();
  if token.is_none() {
    tracing::warn!(env = %github.token_env, "no GitHub token set, the publish step will fail");
  }
  let publisher = GitHubPublisher::new(&github.api_url, token, &github.token_env)?;

  let pipeline = Pipeline::new(release_steps(&settings, ctx.git.clone(), Arc::new(publisher)))?.with_progress(progress);

  println!("🚂 Releasing {} ({} bump)", settings.manifest.display(), bump);
  println!("   {}", pipeline.step_names().join(" → "));

  let code = pipeline
    .run(|failure| match failure {
      None => {
        println!();
        println!("✅ Release done");
        ExitCode::SUCCESS
      }
      Some(failure) => failure.error.exit_code().into(),
    })
    .await;

  Ok(code)
}
