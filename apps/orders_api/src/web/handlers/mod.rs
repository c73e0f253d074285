// apps/orders_api/src/web/handlers/mod.rs

pub mod health_handlers;
pub mod index_handlers;
pub mod metrics_handlers;
pub mod order_handlers;
