//! End-to-end tests for the release-train binary

mod helpers;
mod test_plan;
mod test_release;
