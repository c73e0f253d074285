// orderflow/src/pipeline/definition.rs

use crate::core::context::Handler;
use crate::core::step::StepDef;
use crate::error::PipelineError;
use std::collections::HashMap;

/// An ordered list of named steps over per-run data `TData`, whose handlers
/// fail with `Err`.
///
/// `Err` must be constructible from `PipelineError` so that engine-level
/// failures (a required step with no handler) surface through the same
/// channel as handler failures.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Creates a pipeline from `(step_name, optional)` pairs, in execution order.
  pub fn new(step_defs: &[(&str, bool)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(name, optional)| StepDef {
        name: (*name).to_string(),
        optional: *optional,
      })
      .collect();

    Self {
      steps,
      on: HashMap::new(),
    }
  }

  /// Panics if the step is not declared. A typo in a step name is a wiring
  /// bug, not a runtime condition.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    if !self.has_step(step_name) {
      panic!(
        "Pipeline setup error: {}",
        PipelineError::StepNotFound {
          step_name: step_name.to_string()
        }
      );
    }
  }

  pub fn has_step(&self, step_name: &str) -> bool {
    self.steps.iter().any(|s| s.name == step_name)
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub fn handler_count(&self, step_name: &str) -> usize {
    self.on.get(step_name).map_or(0, Vec::len)
  }
}

impl<TData, Err> std::fmt::Debug for Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Pipeline")
      .field("steps", &self.steps)
      .field("data_type", &std::any::type_name::<TData>())
      .finish()
  }
}
