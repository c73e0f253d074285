// orderflow/src/transport/nats.rs

//! NATS JetStream binding of `QueueTransport`.
//!
//! The queue is a file-backed work-queue stream, so a message survives a
//! server restart and is removed once a consumer acknowledges it. The stream
//! and the durable pull consumer are declared idempotently by whichever
//! process starts first.

use async_nats::connection::State;
use async_nats::jetstream::{self, consumer::pull, consumer::AckPolicy, stream};
use async_trait::async_trait;
use futures_util::StreamExt;
use tracing::{debug, info};

use super::{Acknowledge, Delivery, DeliveryStream, QueueBinding, QueueTransport, TransportError};

/// Producer- and consumer-side connection to the order queue.
///
/// The client is established once and reused for every publish. The
/// transport never re-declares anything after startup; readiness follows
/// the client's connection state.
#[derive(Clone)]
pub struct NatsTransport {
  client: async_nats::Client,
  jetstream: jetstream::Context,
  binding: QueueBinding,
  consumer_name: String,
}

impl NatsTransport {
  /// Connects to `url` and declares the queue's stream.
  pub async fn connect(url: &str, binding: QueueBinding, consumer_name: impl Into<String>) -> anyhow::Result<Self> {
    let client = async_nats::ConnectOptions::new()
      .name(format!("orderflow-{}", binding.queue))
      .connect(url)
      .await?;
    let jetstream = jetstream::new(client.clone());

    let transport = Self {
      client,
      jetstream,
      binding,
      consumer_name: consumer_name.into(),
    };
    transport.declare_queue().await?;
    Ok(transport)
  }

  pub fn binding(&self) -> &QueueBinding {
    &self.binding
  }

  async fn declare_queue(&self) -> anyhow::Result<()> {
    let config = stream::Config {
      name: self.binding.stream.clone(),
      subjects: vec![self.binding.subject.clone()],
      description: Some(format!("Durable queue '{}'", self.binding.queue)),
      retention: stream::RetentionPolicy::WorkQueue,
      storage: stream::StorageType::File,
      ..Default::default()
    };
    self.jetstream.get_or_create_stream(config).await?;
    info!(queue = %self.binding.queue, stream = %self.binding.stream, "queue_declared");
    Ok(())
  }
}

#[async_trait]
impl QueueTransport for NatsTransport {
  async fn publish(&self, body: Vec<u8>) -> Result<(), TransportError> {
    let publish_error = |reason: String| TransportError::Publish {
      queue: self.binding.queue.clone(),
      reason,
    };

    let ack = self
      .jetstream
      .publish(self.binding.subject.clone(), body.into())
      .await
      .map_err(|e| publish_error(e.to_string()))?;

    // Resolves once the stream has stored the message.
    let stored = ack.await.map_err(|e| publish_error(e.to_string()))?;
    debug!(stream = %stored.stream, sequence = stored.sequence, "publish_acknowledged");
    Ok(())
  }

  async fn deliveries(&self) -> Result<DeliveryStream, TransportError> {
    let subscribe_error = |reason: String| TransportError::Subscribe {
      queue: self.binding.queue.clone(),
      reason,
    };

    let stream = self
      .jetstream
      .get_stream(&self.binding.stream)
      .await
      .map_err(|e| subscribe_error(e.to_string()))?;

    let consumer: pull::Stream = stream
      .get_or_create_consumer(
        &self.consumer_name,
        pull::Config {
          durable_name: Some(self.consumer_name.clone()),
          ack_policy: AckPolicy::Explicit,
          ..Default::default()
        },
      )
      .await
      .map_err(|e| subscribe_error(e.to_string()))?
      .messages()
      .await
      .map_err(|e| subscribe_error(e.to_string()))?;

    info!(queue = %self.binding.queue, consumer = %self.consumer_name, "consumer_attached");

    let deliveries = consumer.map(|received| match received {
      Ok(message) => {
        let body = message.payload.to_vec();
        Ok(Delivery::new(body, Box::new(JetStreamAck(message))))
      }
      Err(e) => Err(TransportError::Stream(e.to_string())),
    });
    Ok(deliveries.boxed())
  }

  fn is_connected(&self) -> bool {
    self.client.connection_state() == State::Connected
  }
}

struct JetStreamAck(jetstream::Message);

#[async_trait]
impl Acknowledge for JetStreamAck {
  async fn ack(self: Box<Self>) -> Result<(), TransportError> {
    self.0.ack().await.map_err(|e| TransportError::Ack(e.to_string()))
  }
}
