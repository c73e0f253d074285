// apps/orders_api/src/web/handlers/health_handlers.rs

use actix_web::{web, HttpResponse};
use orderflow::readiness;

use crate::state::AppState;

/// Liveness: the process is up and serving.
pub async fn healthz_handler() -> HttpResponse {
  HttpResponse::Ok().content_type("text/plain; charset=utf-8").body("ok")
}

/// Readiness: the queue connection is up. The store is not consulted; a
/// store outage only affects the listing views.
pub async fn readyz_handler(app_state: web::Data<AppState>) -> HttpResponse {
  match readiness::check_transport(app_state.transport.as_ref()) {
    Ok(()) => HttpResponse::Ok().content_type("text/plain; charset=utf-8").body("ready"),
    Err(e) => {
      tracing::warn!(reason = %e, "readiness_check_failed");
      HttpResponse::ServiceUnavailable()
        .content_type("text/plain; charset=utf-8")
        .body("transport_not_ready")
    }
  }
}
