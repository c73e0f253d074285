// apps/orders_api/src/web/handlers/metrics_handlers.rs

use actix_web::{web, HttpResponse};
use orderflow::metrics::{render, TEXT_CONTENT_TYPE};

use crate::state::AppState;

pub async fn metrics_handler(app_state: web::Data<AppState>) -> HttpResponse {
  match render(&app_state.registry) {
    Ok(body) => HttpResponse::Ok().content_type(TEXT_CONTENT_TYPE).body(body),
    Err(e) => {
      tracing::error!(error = %e, "metrics_encode_failed");
      HttpResponse::InternalServerError().body(e.to_string())
    }
  }
}
