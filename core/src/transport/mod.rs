// orderflow/src/transport/mod.rs

//! The durable queue between the ingress and the worker.
//!
//! `QueueTransport` is the seam: `NatsTransport` binds it to a JetStream
//! work-queue stream, `InMemoryQueue` backs the tests.

pub mod memory;
pub mod nats;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use thiserror::Error;

pub use memory::InMemoryQueue;
pub use nats::NatsTransport;

/// Fixed name of the order queue.
pub const ORDERS_QUEUE: &str = "orders";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
  #[error("queue transport is not connected")]
  Disconnected,

  #[error("failed to publish to queue '{queue}': {reason}")]
  Publish { queue: String, reason: String },

  #[error("failed to subscribe to queue '{queue}': {reason}")]
  Subscribe { queue: String, reason: String },

  #[error("delivery stream failed: {0}")]
  Stream(String),

  #[error("failed to acknowledge delivery: {0}")]
  Ack(String),

  #[error("delivery stream is already taken or closed")]
  Closed,
}

/// Names derived from the queue name: the durable stream holding the
/// messages and the subject they are published on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueBinding {
  pub queue: String,
  pub stream: String,
  pub subject: String,
}

impl QueueBinding {
  pub fn new(queue: impl Into<String>) -> Self {
    let queue = queue.into();
    Self {
      stream: queue.to_uppercase().replace(&['.', ' ', '*', '>'][..], "_"),
      subject: queue.clone(),
      queue,
    }
  }
}

impl Default for QueueBinding {
  fn default() -> Self {
    Self::new(ORDERS_QUEUE)
  }
}

/// One-shot acknowledgement of a single delivery.
#[async_trait]
pub trait Acknowledge: Send {
  async fn ack(self: Box<Self>) -> Result<(), TransportError>;
}

/// One message received from the queue.
pub struct Delivery {
  body: Vec<u8>,
  acker: Option<Box<dyn Acknowledge>>,
}

impl Delivery {
  pub fn new(body: Vec<u8>, acker: Box<dyn Acknowledge>) -> Self {
    Self {
      body,
      acker: Some(acker),
    }
  }

  pub fn body(&self) -> &[u8] {
    &self.body
  }

  pub fn into_body(self) -> Vec<u8> {
    self.body
  }

  pub fn is_acked(&self) -> bool {
    self.acker.is_none()
  }

  /// Acknowledges the delivery. Calling it again is a no-op.
  pub async fn ack(&mut self) -> Result<(), TransportError> {
    match self.acker.take() {
      Some(acker) => acker.ack().await,
      None => Ok(()),
    }
  }
}

impl std::fmt::Debug for Delivery {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Delivery")
      .field("body_len", &self.body.len())
      .field("acked", &self.is_acked())
      .finish()
  }
}

pub type DeliveryStream = BoxStream<'static, Result<Delivery, TransportError>>;

#[async_trait]
pub trait QueueTransport: Send + Sync {
  /// Enqueues one body and resolves once the transport has durably accepted it.
  async fn publish(&self, body: Vec<u8>) -> Result<(), TransportError>;

  /// Opens the delivery stream. The stream ends when the connection is lost.
  async fn deliveries(&self) -> Result<DeliveryStream, TransportError>;

  /// Liveness of the underlying connection, used by readiness probes.
  fn is_connected(&self) -> bool;
}
