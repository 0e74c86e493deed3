//! Sequential, fail-fast release pipeline
//!
//! A [`Pipeline`] owns an ordered list of [`Step`]s. Each step is awaited to completion
//! before the next one starts, and the first error ends the run. Steps that already
//! finished keep their side effects; nothing is rolled back or retried.

use crate::core::error::{ReleaseError, ReleaseResult, print_error};
use crate::ui::progress::StepProgress;
use async_trait::async_trait;
use std::fmt;
use std::time::Instant;

/// One named unit of release work
#[async_trait]
pub trait Step: Send + Sync {
  /// Short, stable identifier ("bump", "commit", ...)
  fn name(&self) -> &'static str;

  /// Human-readable summary shown before the step runs
  fn description(&self) -> String {
    self.name().to_string()
  }

  /// Perform the side effect
  async fn run(&self) -> ReleaseResult<()>;
}

/// The first step that failed, and its error unchanged
#[derive(Debug)]
pub struct PipelineFailure {
  pub step: &'static str,
  /// Zero-based position of the step in the pipeline
  pub index: usize,
  pub error: ReleaseError,
}

impl fmt::Display for PipelineFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Step '{}' failed: {}", self.step, self.error)
  }
}

impl std::error::Error for PipelineFailure {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    Some(&self.error)
  }
}

/// Steps that completed, in order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PipelineSummary {
  pub completed: Vec<&'static str>,
}

pub struct Pipeline {
  steps: Vec<Box<dyn Step>>,
  progress: bool,
}

impl Pipeline {
  /// Build a pipeline; an empty step list is rejected
  pub fn new(steps: Vec<Box<dyn Step>>) -> ReleaseResult<Self> {
    if steps.is_empty() {
      return Err(ReleaseError::with_help(
        "Release pipeline has no steps",
        "Pass at least one step to Pipeline::new",
      ));
    }

    Ok(Self { steps, progress: false })
  }

  /// Draw a progress bar while the steps run
  pub fn with_progress(mut self, enabled: bool) -> Self {
    self.progress = enabled;
    self
  }

  /// Step names in execution order
  pub fn step_names(&self) -> Vec<&'static str> {
    self.steps.iter().map(|s| s.name()).collect()
  }

  /// Run every step in order, stopping at the first failure
  pub async fn execute(&self) -> Result<PipelineSummary, PipelineFailure> {
    let total = self.steps.len();
    let mut summary = PipelineSummary::default();
    let mut progress = self.progress.then(|| StepProgress::new(total, "Releasing"));

    for (index, step) in self.steps.iter().enumerate() {
      println!("\n[{}/{}] {}", index + 1, total, step.description());
      tracing::info!(step = step.name(), index, "step started");
      let started = Instant::now();

      if let Err(error) = step.run().await {
        tracing::debug!(step = step.name(), elapsed_ms = started.elapsed().as_millis() as u64, "step failed");
        return Err(PipelineFailure {
          step: step.name(),
          index,
          error,
        });
      }

      tracing::info!(
        step = step.name(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "step finished"
      );
      summary.completed.push(step.name());

      if let Some(progress) = progress.as_mut() {
        progress.inc();
      }
    }

    Ok(summary)
  }

  /// Run the pipeline and hand the outcome to `on_complete`
  ///
  /// `on_complete` is called exactly once: with `None` when every step succeeded, or
  /// with the first failure after it has been printed to stderr.
  pub async fn run<F, T>(&self, on_complete: F) -> T
  where
    F: FnOnce(Option<&PipelineFailure>) -> T,
  {
    match self.execute().await {
      Ok(summary) => {
        tracing::debug!(completed = ?summary.completed, "pipeline finished");
        on_complete(None)
      }
      Err(failure) => {
        tracing::error!(step = failure.step, index = failure.index, error = %failure.error, "pipeline aborted");
        eprintln!("\n⛔ Release stopped at step '{}'", failure.step);
        print_error(&failure.error);
        on_complete(Some(&failure))
      }
    }
  }
}
