// apps/orders_worker/src/health.rs

//! The worker's HTTP surface: liveness, readiness and metrics.

use actix_web::{web, HttpResponse};
use orderflow::metrics::{render, TEXT_CONTENT_TYPE};
use orderflow::{readiness, OrderStore, QueueTransport};
use prometheus::Registry;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct WorkerState {
  pub transport: Arc<dyn QueueTransport>,
  pub store: Arc<dyn OrderStore>,
  pub registry: Arc<Registry>,
  pub readiness_timeout: Duration,
}

pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/healthz", web::get().to(healthz_handler))
    .route("/readyz", web::get().to(readyz_handler))
    .route("/metrics", web::get().to(metrics_handler));
}

async fn healthz_handler() -> HttpResponse {
  HttpResponse::Ok().content_type("text/plain; charset=utf-8").body("ok")
}

/// Ready while the queue connection is up and the store answers a ping
/// within the readiness timeout.
async fn readyz_handler(state: web::Data<WorkerState>) -> HttpResponse {
  match readiness::check_worker(state.transport.as_ref(), state.store.as_ref(), state.readiness_timeout).await {
    Ok(()) => HttpResponse::Ok().content_type("text/plain; charset=utf-8").body("ready"),
    Err(e) => {
      tracing::warn!(reason = %e, "readiness_check_failed");
      HttpResponse::ServiceUnavailable()
        .content_type("text/plain; charset=utf-8")
        .body("not-ready")
    }
  }
}

async fn metrics_handler(state: web::Data<WorkerState>) -> HttpResponse {
  match render(&state.registry) {
    Ok(body) => HttpResponse::Ok().content_type(TEXT_CONTENT_TYPE).body(body),
    Err(e) => {
      tracing::error!(error = %e, "metrics_encode_failed");
      HttpResponse::InternalServerError().body(e.to_string())
    }
  }
}
