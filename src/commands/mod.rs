//! CLI commands for release-train
//!
//! - **release**: run the five-step release pipeline (or preview it with `--dry-run`)
//! - **plan**: show what the next release would do
//!
//! All commands accept `&ReleaseContext` so config and git are loaded once.

pub mod plan;
pub mod release;

pub use plan::run_plan;
pub use release::run_release;
