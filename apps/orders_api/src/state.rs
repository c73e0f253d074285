// apps/orders_api/src/state.rs
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::pipelines::contexts::IngestCtxData;
use crate::pipelines::ingest_pipeline::build_ingest_pipeline;
use orderflow::{IngressMetrics, OrderPublisher, OrderStore, Pipeline, QueueTransport};
use prometheus::Registry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn OrderStore>,
  pub transport: Arc<dyn QueueTransport>,
  pub publisher: OrderPublisher,
  pub ingest_pipeline: Arc<Pipeline<IngestCtxData, AppError>>,
  pub metrics: IngressMetrics,
  pub registry: Arc<Registry>,
}

impl AppState {
  /// Wires the shared handles. `registry` must be fresh: the ingress
  /// counters are registered into it here.
  pub fn new(
    config: &AppConfig,
    transport: Arc<dyn QueueTransport>,
    store: Arc<dyn OrderStore>,
    registry: Arc<Registry>,
  ) -> Result<Self, prometheus::Error> {
    let metrics = IngressMetrics::new(&registry)?;
    let publisher = OrderPublisher::new(transport.clone(), config.publish_timeout);
    Ok(Self {
      store,
      transport,
      publisher,
      ingest_pipeline: Arc::new(build_ingest_pipeline()),
      metrics,
      registry,
    })
  }
}
