// orderflow/src/pipeline/execution.rs

//! `Pipeline::run()`: executes the declared steps against one context.

use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::error::PipelineError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Executes every step in declaration order against `ctx_data`.
  ///
  /// The first handler error aborts the run and is returned as is. A
  /// non-optional step without handlers fails with
  /// `PipelineError::HandlerMissing`, converted into `Err`.
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::TRACE, num_steps = self.steps.len(), "Pipeline run starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();

      let handlers = match self.on.get(step_name) {
        Some(handlers) if !handlers.is_empty() => handlers,
        _ if step_def.optional => {
          event!(Level::DEBUG, step = step_name, "Optional step has no handlers, skipping.");
          continue;
        }
        _ => {
          event!(Level::ERROR, step = step_name, "Non-optional step has no handlers.");
          return Err(Err::from(PipelineError::HandlerMissing {
            step_name: step_def.name.clone(),
          }));
        }
      };

      let step_span = tracing::info_span!("pipeline_step", step = step_name, step_index = step_idx);

      for handler_fn in handlers {
        match handler_fn(ctx_data.clone()).instrument(step_span.clone()).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => {
            event!(Level::DEBUG, step = step_name, "Pipeline stopped by handler.");
            return Ok(PipelineResult::Stopped);
          }
          Err(e) => {
            event!(Level::DEBUG, step = step_name, error = %e, "Step handler failed.");
            return Err(e);
          }
        }
      }
    }

    Ok(PipelineResult::Completed)
  }
}
