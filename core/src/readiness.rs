// orderflow/src/readiness.rs

//! Readiness checks shared by both binaries.

use std::time::Duration;
use thiserror::Error;

use crate::store::OrderStore;
use crate::transport::QueueTransport;

/// Ceiling on one readiness probe of the store.
pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotReady {
  #[error("queue transport is not connected")]
  TransportDown,

  #[error("store is unreachable: {0}")]
  StoreUnreachable(String),
}

/// The ingress is ready while it can publish.
pub fn check_transport(transport: &dyn QueueTransport) -> Result<(), NotReady> {
  if transport.is_connected() {
    Ok(())
  } else {
    Err(NotReady::TransportDown)
  }
}

/// The worker is ready while it can both receive and persist.
pub async fn check_worker(
  transport: &dyn QueueTransport,
  store: &dyn OrderStore,
  timeout: Duration,
) -> Result<(), NotReady> {
  check_transport(transport)?;
  match tokio::time::timeout(timeout, store.ping()).await {
    Ok(Ok(())) => Ok(()),
    Ok(Err(e)) => Err(NotReady::StoreUnreachable(e.to_string())),
    Err(_) => Err(NotReady::StoreUnreachable(format!("ping exceeded {timeout:?}"))),
  }
}
