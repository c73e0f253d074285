// apps/orders_api/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{health_handlers, index_handlers, metrics_handlers, order_handlers};

// Methods other than GET and POST on /orders fall through to the resource's
// default service, which answers 405.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/", web::get().to(index_handlers::index_handler))
    .route("/healthz", web::get().to(health_handlers::healthz_handler))
    .route("/readyz", web::get().to(health_handlers::readyz_handler))
    .route("/metrics", web::get().to(metrics_handlers::metrics_handler))
    .service(
      web::resource("/orders")
        .route(web::post().to(order_handlers::create_order_handler))
        .route(web::get().to(order_handlers::list_orders_handler)),
    );
}
