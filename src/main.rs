mod commands;
mod core;
mod release;
mod ui;

use clap::{ArgAction, Parser, Subcommand};
use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseResult, print_error};
use crate::release::VersionBump;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Bump, commit, push, tag and publish a release
#[derive(Parser)]
#[command(name = "release-train")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Project root (default: current directory)
  #[arg(long, global = true, value_name = "DIR")]
  root: Option<PathBuf>,

  /// Increase log verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = ArgAction::Count, global = true)]
  verbose: u8,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run the release: bump, commit, push, tag, publish
  Release {
    /// Version increment
    #[arg(short = 't', long = "type", value_enum, env = "RELEASE_TYPE", default_value_t = BumpArg::Patch)]
    bump: BumpArg,
    /// Show the plan without making changes
    #[arg(long)]
    dry_run: bool,
  },

  /// Preview the next release
  Plan {
    /// Version increment
    #[arg(short = 't', long = "type", value_enum, env = "RELEASE_TYPE", default_value_t = BumpArg::Patch)]
    bump: BumpArg,
    /// Output the plan in JSON format
    #[arg(long)]
    json: bool,
  },
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum BumpArg {
  Major,
  Minor,
  Patch,
}

impl From<BumpArg> for VersionBump {
  fn from(arg: BumpArg) -> Self {
    match arg {
      BumpArg::Major => VersionBump::Major,
      BumpArg::Minor => VersionBump::Minor,
      BumpArg::Patch => VersionBump::Patch,
    }
  }
}

fn get_styles() -> clap::builder::Styles {
  let yellow = anstyle::Color::Ansi(anstyle::AnsiColor::Yellow);
  let green = anstyle::Color::Ansi(anstyle::AnsiColor::Green);
  let red = anstyle::Color::Ansi(anstyle::AnsiColor::Red);

  clap::builder::Styles::styled()
    .usage(anstyle::Style::new().bold().underline().fg_color(Some(yellow)))
    .header(anstyle::Style::new().bold().underline().fg_color(Some(yellow)))
    .literal(anstyle::Style::new().fg_color(Some(green)))
    .invalid(anstyle::Style::new().bold().fg_color(Some(red)))
    .error(anstyle::Style::new().bold().fg_color(Some(red)))
    .valid(anstyle::Style::new().bold().underline().fg_color(Some(green)))
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// Log to stderr; `RELEASE_TRAIN_LOG` overrides the `-v` level
fn init_tracing(verbose: u8) {
  let level = match verbose {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  };
  let filter = EnvFilter::try_from_env("RELEASE_TRAIN_LOG")
    .unwrap_or_else(|_| EnvFilter::new(format!("release_train={},warn", level)));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();
}

async fn run(cli: Cli) -> ReleaseResult<ExitCode> {
  let root = match cli.root {
    Some(root) => root,
    None => std::env::current_dir()?,
  };
  let ctx = ReleaseContext::build(&root).await?;

  match cli.command {
    Commands::Release { bump, dry_run } => {
      commands::run_release(&ctx, bump.into(), dry_run, ui::progress::progress_enabled()).await
    }
    Commands::Plan { bump, json } => commands::run_plan(&ctx, bump.into(), json).await,
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
    Ok(runtime) => runtime,
    Err(e) => {
      eprintln!("Error: Failed to start async runtime: {}", e);
      return ExitCode::FAILURE;
    }
  };

  // Pipeline failures are printed by the pipeline itself and arrive here as an exit code
  match runtime.block_on(run(cli)) {
    Ok(code) => code,
    Err(err) => {
      print_error(&err);
      err.exit_code().into()
    }
  }
}
