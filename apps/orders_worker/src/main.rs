// apps/orders_worker/src/main.rs

mod config;
mod errors;
mod health;

use crate::config::{LogFormat, WorkerConfig};
use crate::errors::WorkerError;
use crate::health::WorkerState;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use orderflow::{ConsumerMetrics, NatsTransport, OrderConsumer, OrderStore, PgOrderStore, QueueBinding};
use prometheus::Registry;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DB_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt().with_env_filter(filter);
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}

async fn connect_store(cfg: &WorkerConfig) -> anyhow::Result<PgOrderStore> {
  let store = PgOrderStore::connect(&cfg.database_url, cfg.db_max_connections, DB_CONNECT_TIMEOUT)
    .await
    .context("postgres_connect_failed")?;
  tokio::time::timeout(DB_CONNECT_TIMEOUT, store.ping())
    .await
    .context("postgres_ping_timed_out")?
    .context("postgres_ping_failed")?;
  store.ensure_schema().await.context("postgres_schema_failed")?;
  tracing::info!("postgres_ready");
  Ok(store)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let cfg = match WorkerConfig::from_env() {
    Ok(cfg) => cfg,
    Err(e) => {
      init_tracing(LogFormat::Json);
      tracing::error!(error = %e, "config_invalid");
      return Err(e.into());
    }
  };
  init_tracing(cfg.log_format);
  tracing::info!("Starting orders-worker...");

  let store: Arc<dyn OrderStore> = Arc::new(connect_store(&cfg).await?);
  let transport = Arc::new(
    NatsTransport::connect(&cfg.nats_url, QueueBinding::new(cfg.orders_queue.as_str()), cfg.consumer_name.as_str())
      .await
      .context("nats_connect_failed")?,
  );

  let registry = Arc::new(Registry::new());
  let metrics = ConsumerMetrics::new(&registry).context("metrics_register_failed")?;
  let consumer = OrderConsumer::new(transport.clone(), store.clone(), metrics, cfg.insert_timeout);

  let state = WorkerState {
    transport,
    store,
    registry,
    readiness_timeout: cfg.readiness_timeout,
  };
  let metrics_address = cfg.metrics_address();
  let server = HttpServer::new(move || {
    App::new()
      .app_data(web::Data::new(state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(health::configure_health_routes)
  })
  .workers(1)
  .bind(&metrics_address)?
  .run();
  let server_handle = server.handle();
  tracing::info!(addr = %metrics_address, queue = %cfg.orders_queue, "worker_listening");

  // The consumer never ends on its own while healthy. Whichever side stops
  // first takes the process down; a supervisor restarts it.
  let exit: Result<(), WorkerError> = tokio::select! {
    consumed = consumer.run() => match consumed {
      Ok(processed) => Err(WorkerError::ChannelClosed { processed }),
      Err(e) => Err(WorkerError::Transport(e)),
    },
    served = server => served.map_err(WorkerError::Listener),
  };
  server_handle.stop(true).await;

  match exit {
    Ok(()) => {
      tracing::info!("worker_stopped");
      Ok(())
    }
    Err(e) => {
      tracing::error!(error = %e, "worker_exiting");
      Err(e.into())
    }
  }
}
