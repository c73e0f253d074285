// apps/orders_api/src/main.rs

mod config;
mod errors;
mod pipelines;
mod state;
mod web;

use crate::config::{AppConfig, LogFormat};
use crate::state::AppState;

use actix_web::middleware::from_fn;
use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use orderflow::{NatsTransport, PgOrderStore, QueueBinding};
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

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      init_tracing(LogFormat::Json);
      tracing::error!(error = %e, "config_invalid");
      return Err(e.into());
    }
  };
  init_tracing(app_config.log_format);
  tracing::info!("Starting orders-api...");

  let store = PgOrderStore::connect(&app_config.database_url, app_config.db_max_connections, DB_CONNECT_TIMEOUT)
    .await
    .context("postgres_connect_failed")?;
  store.ensure_schema().await.context("postgres_schema_failed")?;

  let transport = NatsTransport::connect(
    &app_config.nats_url,
    QueueBinding::new(app_config.orders_queue.as_str()),
    "orders-api",
  )
  .await
  .context("nats_connect_failed")?;

  let app_state = AppState::new(
    &app_config,
    Arc::new(transport),
    Arc::new(store),
    Arc::new(Registry::new()),
  )
  .context("metrics_register_failed")?;

  let server_address = app_config.bind_address();
  tracing::info!(addr = %server_address, queue = %app_config.orders_queue, "orders_api_listening");

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(from_fn(web::middleware::record_http_metrics))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await?;

  Ok(())
}
