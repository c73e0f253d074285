// apps/orders_api/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use orderflow::store::RECENT_ORDERS_LIMIT;
use orderflow::{ContextData, IngressOutcome, PipelineResult};
use serde_json::json;
use tracing::{error, instrument};

use crate::errors::AppError;
use crate::pipelines::contexts::IngestCtxData;
use crate::state::AppState;

/// `POST /orders`: accept an order for asynchronous processing.
///
/// 202 means the message is durably queued, not that it is persisted; the
/// worker inserts it later.
#[instrument(name = "handler::create_order", skip(app_state, body))]
pub async fn create_order_handler(app_state: web::Data<AppState>, body: web::Bytes) -> Result<HttpResponse, AppError> {
  let ctx_data = ContextData::new(IngestCtxData::new(app_state.publisher.clone(), body.to_vec()));

  let result = match app_state.ingest_pipeline.run(ctx_data).await {
    Ok(PipelineResult::Completed) => Ok(()),
    Ok(PipelineResult::Stopped) => Err(AppError::Internal("ingest pipeline halted before publish".to_string())),
    Err(app_err) => Err(app_err),
  };

  match result {
    Ok(()) => {
      app_state.metrics.record_outcome(IngressOutcome::Accepted);
      Ok(HttpResponse::Accepted().json(json!({ "status": "accepted" })))
    }
    Err(app_err) => {
      app_state.metrics.record_outcome(app_err.ingress_outcome());
      Err(app_err)
    }
  }
}

/// `GET /orders`: the most recent orders, newest first.
#[instrument(name = "handler::list_orders", skip(app_state))]
pub async fn list_orders_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let orders = app_state
    .store
    .list_recent_orders(RECENT_ORDERS_LIMIT)
    .await
    .map_err(|e| {
      error!(error = %e, "list_orders_failed");
      AppError::Store(e)
    })?;

  Ok(HttpResponse::Ok().json(orders))
}
