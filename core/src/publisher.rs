// orderflow/src/publisher.rs

//! Producer side of the queue.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::message::{OrderCreateRequest, OrderMessage};
use crate::transport::{QueueTransport, TransportError};

/// Ceiling on waiting for the transport to accept one message.
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum PublishError {
  #[error("failed to serialize order message: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("queue did not acknowledge the publish within {0:?}")]
  Timeout(Duration),

  #[error(transparent)]
  Transport(#[from] TransportError),

  #[error("publish task aborted: {0}")]
  Aborted(String),
}

impl PublishError {
  /// Whether the failure lies with the queue rather than with this process.
  pub fn is_upstream(&self) -> bool {
    matches!(self, PublishError::Timeout(_) | PublishError::Transport(_))
  }
}

/// Hands order messages to the durable queue.
///
/// One publisher, and so one transport connection, is shared by every
/// request; the transport client serializes concurrent publishes itself.
#[derive(Clone)]
pub struct OrderPublisher {
  transport: Arc<dyn QueueTransport>,
  publish_timeout: Duration,
}

impl OrderPublisher {
  pub fn new(transport: Arc<dyn QueueTransport>, publish_timeout: Duration) -> Self {
    Self {
      transport,
      publish_timeout,
    }
  }

  pub fn publish_timeout(&self) -> Duration {
    self.publish_timeout
  }

  pub fn is_connected(&self) -> bool {
    self.transport.is_connected()
  }

  /// Serializes the order into an `OrderMessage` and enqueues it.
  ///
  /// Success means the transport acknowledged the message as stored. The
  /// caller validates `order_id`; nothing is sent if encoding fails.
  #[instrument(name = "OrderPublisher::publish", skip(self, order), fields(order_id = %order.order_id))]
  pub async fn publish(&self, order: &OrderCreateRequest) -> Result<(), PublishError> {
    let message = OrderMessage::from_request(order);
    let body = message.encode()?;

    match tokio::time::timeout(self.publish_timeout, self.transport.publish(body)).await {
      Ok(Ok(())) => {
        debug!("order message enqueued");
        Ok(())
      }
      Ok(Err(e)) => Err(PublishError::Transport(e)),
      Err(_) => Err(PublishError::Timeout(self.publish_timeout)),
    }
  }

  /// Like `publish`, but on its own task: once started, the publish runs to
  /// completion or timeout even if the awaiting caller is dropped.
  pub async fn publish_detached(&self, order: OrderCreateRequest) -> Result<(), PublishError> {
    let publisher = self.clone();
    tokio::spawn(async move { publisher.publish(&order).await })
      .await
      .map_err(|e| PublishError::Aborted(e.to_string()))?
  }
}

impl std::fmt::Debug for OrderPublisher {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("OrderPublisher")
      .field("publish_timeout", &self.publish_timeout)
      .field("connected", &self.transport.is_connected())
      .finish()
  }
}
