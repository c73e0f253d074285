// orderflow/src/error.rs
use thiserror::Error;

/// Errors raised by the pipeline engine itself, as opposed to errors
/// returned by step handlers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },
}
