// apps/orders_api/src/pipelines/ingest_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::contexts::IngestCtxData;
use orderflow::{ContextData, OrderCreateRequest, Pipeline, PipelineControl};
use tracing::{error, info, warn};

pub const DECODE_STEP: &str = "decode_order_request";
pub const PUBLISH_STEP: &str = "publish_order";

/// Builds the `POST /orders` pipeline: validate the body, then publish.
pub fn build_ingest_pipeline() -> Pipeline<IngestCtxData, AppError> {
  let mut ingest_p = Pipeline::<IngestCtxData, AppError>::new(&[(DECODE_STEP, false), (PUBLISH_STEP, false)]);

  ingest_p.on_step(DECODE_STEP, |ctx_data: ContextData<IngestCtxData>| {
    Box::pin(async move {
      let decoded = OrderCreateRequest::decode(&ctx_data.read().body);
      match decoded {
        Ok(request) => {
          ctx_data.write().request = Some(request);
          Ok(PipelineControl::Continue)
        }
        Err(e) => {
          warn!(error = %e, "order_invalid_payload");
          Err(AppError::InvalidPayload(e))
        }
      }
    })
  });

  ingest_p.on_step(PUBLISH_STEP, |ctx_data: ContextData<IngestCtxData>| {
    Box::pin(async move {
      let (publisher, request) = {
        let guard = ctx_data.read();
        (guard.publisher.clone(), guard.request.clone())
      };
      let request = request.ok_or_else(|| AppError::Internal("no decoded order request to publish".to_string()))?;
      let order_id = request.order_id.clone();

      match publisher.publish_detached(request).await {
        Ok(()) => {
          info!(order_id = %order_id, "order_published");
          Ok(PipelineControl::Continue)
        }
        Err(e) => {
          error!(order_id = %order_id, error = %e, "order_publish_failed");
          Err(AppError::Publish(e))
        }
      }
    })
  });

  ingest_p
}
