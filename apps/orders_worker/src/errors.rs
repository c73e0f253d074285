// apps/orders_worker/src/errors.rs

use orderflow::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Queue Error: {0}")]
  Transport(#[from] TransportError),

  #[error("delivery stream closed after {processed} messages")]
  ChannelClosed { processed: u64 },

  #[error("health listener stopped: {0}")]
  Listener(#[from] std::io::Error),
}

pub type Result<T, E = WorkerError> = std::result::Result<T, E>;
