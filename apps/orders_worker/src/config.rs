// apps/orders_worker/src/config.rs

use crate::errors::{Result, WorkerError};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Json,
  Pretty,
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
  pub database_url: String,
  pub nats_url: String,
  pub orders_queue: String,
  pub consumer_name: String,
  pub metrics_host: String,
  pub metrics_port: u16,
  pub insert_timeout: Duration,
  pub readiness_timeout: Duration,
  pub db_max_connections: u32,
  pub log_format: LogFormat,
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: String) -> Result<T>
where
  T::Err: std::fmt::Display,
{
  raw
    .parse::<T>()
    .map_err(|e| WorkerError::Config(format!("Invalid {}: {}", key, e)))
}

impl WorkerConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|key| env::var(key).ok())
  }

  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_or = |key: &str, default: &str| lookup(key).filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string());
    let require = |key: &str| {
      lookup(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| WorkerError::Config(format!("Missing environment variable '{}'", key)))
    };

    let database_url = require("DATABASE_URL").or_else(|_| require("POSTGRES_DSN"))?;
    let nats_url = require("NATS_URL")?;
    let log_format = match get_or("LOG_FORMAT", "json").to_ascii_lowercase().as_str() {
      "json" => LogFormat::Json,
      "pretty" | "text" => LogFormat::Pretty,
      other => return Err(WorkerError::Config(format!("Invalid LOG_FORMAT '{}'", other))),
    };

    Ok(Self {
      database_url,
      nats_url,
      orders_queue: get_or("ORDERS_QUEUE", orderflow::transport::ORDERS_QUEUE),
      consumer_name: get_or("CONSUMER_NAME", "orders-worker"),
      metrics_host: get_or("METRICS_HOST", "0.0.0.0"),
      metrics_port: parse_var("METRICS_PORT", get_or("METRICS_PORT", "8081"))?,
      insert_timeout: Duration::from_millis(parse_var("INSERT_TIMEOUT_MS", get_or("INSERT_TIMEOUT_MS", "2000"))?),
      readiness_timeout: Duration::from_millis(parse_var(
        "READINESS_TIMEOUT_MS",
        get_or("READINESS_TIMEOUT_MS", "2000"),
      )?),
      db_max_connections: parse_var("DB_MAX_CONNECTIONS", get_or("DB_MAX_CONNECTIONS", "5"))?,
      log_format,
    })
  }

  pub fn metrics_address(&self) -> String {
    format!("{}:{}", self.metrics_host, self.metrics_port)
  }
}
