//! Configuration, errors, manifests and version control

pub mod config;
pub mod context;
pub mod error;
pub mod manifest;
pub mod vcs;
