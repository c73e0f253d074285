// orderflow/src/consumer.rs

//! Consumer side of the queue: drain deliveries, persist orders, count
//! outcomes.
//!
//! Every delivery follows one path with no retries:
//!
//! ```text
//! received -> acked -> decode_order_message -> persist_order_record -> ok
//!                           |                        |
//!                           +-> decode_error         +-> db_error
//! ```
//!
//! The delivery is acknowledged on receipt, before anything is attempted.
//! A crash or a store failure after that point loses the order; the queue
//! will not redeliver it.

use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::core::{ContextData, PipelineControl, PipelineResult};
use crate::error::PipelineError;
use crate::message::{DecodeError, OrderMessage};
use crate::metrics::ConsumerMetrics;
use crate::outcome::MessageOutcome;
use crate::pipeline::Pipeline;
use crate::store::{OrderStore, StoreError};
use crate::transport::{QueueTransport, TransportError};

/// Ceiling on a single insert.
pub const DEFAULT_INSERT_TIMEOUT: Duration = Duration::from_secs(2);

pub const DECODE_STEP: &str = "decode_order_message";
pub const PERSIST_STEP: &str = "persist_order_record";

#[derive(Debug, Error)]
pub enum ConsumeError {
  #[error(transparent)]
  Decode(#[from] DecodeError),

  #[error(transparent)]
  Store(#[from] StoreError),

  #[error(transparent)]
  Pipeline(#[from] PipelineError),
}

impl ConsumeError {
  pub fn outcome(&self) -> MessageOutcome {
    match self {
      ConsumeError::Decode(_) => MessageOutcome::DecodeError,
      ConsumeError::Store(_) | ConsumeError::Pipeline(_) => MessageOutcome::DbError,
    }
  }
}

/// Per-delivery data flowing through the consume pipeline.
pub struct ConsumeCtxData {
  pub store: Arc<dyn OrderStore>,
  pub insert_timeout: Duration,
  pub body: Vec<u8>,
  pub message: Option<OrderMessage>,
}

impl ConsumeCtxData {
  pub fn new(store: Arc<dyn OrderStore>, insert_timeout: Duration, body: Vec<u8>) -> Self {
    Self {
      store,
      insert_timeout,
      body,
      message: None,
    }
  }
}

/// Maps a finished run onto its terminal outcome. A stopped run never
/// reached the store with a valid message.
pub fn classify(result: &Result<PipelineResult, ConsumeError>) -> MessageOutcome {
  match result {
    Ok(PipelineResult::Completed) => MessageOutcome::Ok,
    Ok(PipelineResult::Stopped) => MessageOutcome::DecodeError,
    Err(e) => e.outcome(),
  }
}

/// Builds the two-step consume pipeline.
pub fn build_consume_pipeline() -> Pipeline<ConsumeCtxData, ConsumeError> {
  let mut p = Pipeline::<ConsumeCtxData, ConsumeError>::new(&[(DECODE_STEP, false), (PERSIST_STEP, false)]);

  p.on_step(DECODE_STEP, |ctx_data: ContextData<ConsumeCtxData>| {
    Box::pin(async move {
      let decoded = OrderMessage::decode(&ctx_data.read().body);
      let message = decoded?;
      ctx_data.write().message = Some(message);
      Ok::<_, ConsumeError>(PipelineControl::Continue)
    })
  });

  p.on_step(PERSIST_STEP, |ctx_data: ContextData<ConsumeCtxData>| {
    Box::pin(async move {
      let (store, insert_timeout, message) = {
        let guard = ctx_data.read();
        (guard.store.clone(), guard.insert_timeout, guard.message.clone())
      };
      let Some(message) = message else {
        return Ok::<_, ConsumeError>(PipelineControl::Stop);
      };

      match tokio::time::timeout(insert_timeout, store.insert_order(&message)).await {
        Ok(inserted) => inserted?,
        Err(_) => return Err(StoreError::Timeout(insert_timeout).into()),
      }
      Ok(PipelineControl::Continue)
    })
  });

  p
}

/// Single sequential loop over the queue's deliveries.
pub struct OrderConsumer {
  transport: Arc<dyn QueueTransport>,
  store: Arc<dyn OrderStore>,
  metrics: ConsumerMetrics,
  insert_timeout: Duration,
  pipeline: Pipeline<ConsumeCtxData, ConsumeError>,
}

impl OrderConsumer {
  pub fn new(
    transport: Arc<dyn QueueTransport>,
    store: Arc<dyn OrderStore>,
    metrics: ConsumerMetrics,
    insert_timeout: Duration,
  ) -> Self {
    Self {
      transport,
      store,
      metrics,
      insert_timeout,
      pipeline: build_consume_pipeline(),
    }
  }

  pub fn metrics(&self) -> &ConsumerMetrics {
    &self.metrics
  }

  /// Processes deliveries until the stream ends.
  ///
  /// Returns the number of deliveries handled when the stream closes, or the
  /// stream's error. Either way the caller is expected to exit so the
  /// process supervisor can restart it; there is no reconnect here.
  pub async fn run(&self) -> Result<u64, TransportError> {
    let mut deliveries = self.transport.deliveries().await?;
    info!("worker_consuming");

    let mut processed: u64 = 0;
    while let Some(received) = deliveries.next().await {
      let mut delivery = match received {
        Ok(delivery) => delivery,
        Err(e) => {
          error!(error = %e, processed, "worker_delivery_stream_failed");
          return Err(e);
        }
      };

      if let Err(e) = delivery.ack().await {
        warn!(error = %e, "order_ack_failed");
      }
      self.process(delivery.into_body()).await;
      processed += 1;
    }

    warn!(processed, "worker_msg_channel_closed");
    Ok(processed)
  }

  /// Runs one body through decode and persist, then counts and logs the
  /// outcome. Never fails: every error is a terminal outcome.
  pub async fn process(&self, body: Vec<u8>) -> MessageOutcome {
    let ctx_data = ContextData::new(ConsumeCtxData::new(self.store.clone(), self.insert_timeout, body));
    let result = self.pipeline.run(ctx_data.clone()).await;
    let outcome = classify(&result);
    self.metrics.record(outcome);

    let guard = ctx_data.read();
    match (&result, &guard.message) {
      (Ok(_), Some(message)) => {
        info!(order_id = %message.order_id, quantity = message.quantity, "order_inserted");
      }
      (Err(ConsumeError::Decode(e)), _) => {
        error!(body = %String::from_utf8_lossy(&guard.body), error = %e, "order_decode_failed");
      }
      (Err(e), message) => {
        let order_id = message.as_ref().map(|m| m.order_id.as_str()).unwrap_or_default();
        error!(order_id = %order_id, error = %e, "order_insert_failed");
      }
      (Ok(_), None) => {
        error!(body = %String::from_utf8_lossy(&guard.body), "order_decode_failed");
      }
    }
    outcome
  }
}
