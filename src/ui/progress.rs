//! Progress bar for the release pipeline
//!
//! Uses `linya`; the bar only draws when stderr is a terminal.

use linya::{Bar, Progress};
use std::io::IsTerminal;

/// One bar that advances as release steps finish
pub struct StepProgress {
  progress: Progress,
  bar: Bar,
}

impl StepProgress {
  pub fn new(total: usize, label: impl Into<String>) -> Self {
    let mut progress = Progress::new();
    let bar = progress.bar(total, label.into());
    Self { progress, bar }
  }

  /// Mark one more step as finished
  pub fn inc(&mut self) {
    self.progress.inc_and_draw(&self.bar, 1);
  }
}

/// Whether a progress bar should be drawn at all
pub fn progress_enabled() -> bool {
  std::io::stderr().is_terminal()
}
