// orderflow/src/core/control.rs

//! Signals for controlling pipeline flow and the outcome of a pipeline run.

/// Signal from a step handler telling the pipeline whether to go on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  /// Proceed to the next handler or step.
  Continue,
  /// Halt the run. No further handlers or steps are executed.
  Stop,
}

/// Outcome of a full pipeline run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every declared step ran (optional steps without handlers are skipped).
  Completed,
  /// A handler returned `PipelineControl::Stop`.
  Stopped,
}
