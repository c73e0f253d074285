// apps/orders_api/src/pipelines/mod.rs

//! Request pipelines of the ingress service.

pub mod contexts;
pub mod ingest_pipeline;
