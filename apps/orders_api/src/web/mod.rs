// apps/orders_api/src/web/mod.rs

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use routes::configure_app_routes;
