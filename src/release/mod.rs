//! Release orchestration
//!
//! A release is a fixed sequence of five steps run by a fail-fast [`Pipeline`]:
//!
//! 1. **bump**: increment the manifest version (`major`, `minor` or `patch`)
//! 2. **commit**: stage everything and commit
//! 3. **push**: push the branch to the remote
//! 4. **tag**: tag the version re-read from the manifest, then push tags
//! 5. **publish**: create a GitHub release from the commits since the previous tag
//!
//! A step starts only after the previous one succeeded. The first failure stops the
//! run; completed steps are not rolled back.

pub mod bump;
pub mod github;
pub mod notes;
pub mod pipeline;
pub mod plan;
pub mod steps;
pub mod tags;

pub use bump::VersionBump;
pub use github::GitHubPublisher;
pub use pipeline::Pipeline;
pub use plan::ReleasePlan;
pub use steps::{ReleaseSettings, release_steps};
