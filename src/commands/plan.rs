//! Plan command implementation

use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::release::{ReleasePlan, ReleaseSettings, VersionBump};
use std::process::ExitCode;

/// Show the next release without changing anything
pub async fn run_plan(ctx: &ReleaseContext, bump: VersionBump, json: bool) -> ReleaseResult<ExitCode> {
  let settings = ReleaseSettings::from_config(&ctx.config, &ctx.root, bump)?;
  let plan = ReleasePlan::build(&settings, ctx.git.as_ref()).await?;

  if json {
    println!("{}", serde_json::to_string_pretty(&plan)?);
  } else {
    plan.print();
  }

  Ok(ExitCode::SUCCESS)
}
