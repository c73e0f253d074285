// apps/orders_api/src/web/middleware.rs

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::Method;
use actix_web::middleware::Next;
use actix_web::web;
use std::time::Instant;

use crate::state::AppState;

/// Label of the handler a request is routed to, as used by the HTTP metrics.
pub fn handler_label(method: &Method, path: &str) -> &'static str {
  let get = *method == Method::GET;
  match path {
    "/orders" if *method == Method::POST => "orders_create",
    "/orders" if get => "orders_list",
    "/" if get => "index",
    "/healthz" if get => "healthz",
    "/readyz" if get => "readyz",
    "/metrics" if get => "metrics",
    "/" | "/healthz" | "/readyz" | "/metrics" | "/orders" => "method_not_allowed",
    _ => "not_found",
  }
}

/// Counts every request and observes its duration, labelled by handler,
/// method and final status code.
pub async fn record_http_metrics(
  req: ServiceRequest,
  next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
  let metrics = req.app_data::<web::Data<AppState>>().map(|state| state.metrics.clone());
  let handler = handler_label(req.method(), req.path());
  let method = req.method().to_string();
  let started = Instant::now();

  let res = next.call(req).await?;

  if let Some(metrics) = metrics {
    metrics.observe_request(handler, &method, res.status().as_u16(), started.elapsed().as_secs_f64());
  }
  Ok(res)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn orders_path_is_split_by_method() {
    assert_eq!(handler_label(&Method::POST, "/orders"), "orders_create");
    assert_eq!(handler_label(&Method::GET, "/orders"), "orders_list");
    assert_eq!(handler_label(&Method::GET, "/"), "index");
    assert_eq!(handler_label(&Method::GET, "/nope"), "not_found");
  }

  #[test]
  fn unrouted_methods_are_not_attributed_to_a_handler() {
    assert_eq!(handler_label(&Method::DELETE, "/orders"), "method_not_allowed");
    assert_eq!(handler_label(&Method::PUT, "/orders"), "method_not_allowed");
    assert_eq!(handler_label(&Method::POST, "/healthz"), "method_not_allowed");
    assert_eq!(handler_label(&Method::DELETE, "/nope"), "not_found");
  }
}
