// apps/orders_api/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Json,
  Pretty,
}

impl LogFormat {
  fn parse(value: &str) -> Result<Self> {
    match value.to_ascii_lowercase().as_str() {
      "json" => Ok(LogFormat::Json),
      "pretty" | "text" => Ok(LogFormat::Pretty),
      other => Err(AppError::Config(format!("Invalid LOG_FORMAT '{}'", other))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub nats_url: String,
  pub orders_queue: String,
  pub publish_timeout: Duration,
  pub db_max_connections: u32,
  pub log_format: LogFormat,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|key| env::var(key).ok())
  }

  /// Builds the config from any key lookup; `from_env` passes the process
  /// environment.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_or = |key: &str, default: &str| lookup(key).filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string());
    let require = |key: &str| {
      lookup(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", key)))
    };

    let server_host = get_or("SERVER_HOST", "0.0.0.0");
    let server_port = get_or("SERVER_PORT", "8080")
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = require("DATABASE_URL").or_else(|_| require("POSTGRES_DSN"))?;
    let nats_url = require("NATS_URL")?;
    let orders_queue = get_or("ORDERS_QUEUE", orderflow::transport::ORDERS_QUEUE);
    let publish_timeout_ms = get_or("PUBLISH_TIMEOUT_MS", "5000")
      .parse::<u64>()
      .map_err(|e| AppError::Config(format!("Invalid PUBLISH_TIMEOUT_MS: {}", e)))?;
    let db_max_connections = get_or("DB_MAX_CONNECTIONS", "5")
      .parse::<u32>()
      .map_err(|e| AppError::Config(format!("Invalid DB_MAX_CONNECTIONS: {}", e)))?;
    let log_format = LogFormat::parse(&get_or("LOG_FORMAT", "json"))?;

    Ok(Self {
      server_host,
      server_port,
      database_url,
      nats_url,
      orders_queue,
      publish_timeout: Duration::from_millis(publish_timeout_ms),
      db_max_connections,
      log_format,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}
