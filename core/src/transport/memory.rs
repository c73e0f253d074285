// orderflow/src/transport/memory.rs

//! In-process `QueueTransport` for tests and benchmarks.

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use super::{Acknowledge, Delivery, DeliveryStream, QueueTransport, TransportError};

type QueuedItem = Result<Vec<u8>, TransportError>;

/// FIFO queue held in memory. Every accepted body is also recorded so tests
/// can inspect what was published.
pub struct InMemoryQueue {
  sender: Mutex<Option<mpsc::UnboundedSender<QueuedItem>>>,
  receiver: Mutex<Option<mpsc::UnboundedReceiver<QueuedItem>>>,
  published: Mutex<Vec<Vec<u8>>>,
  publish_attempts: AtomicUsize,
  acked: Arc<AtomicUsize>,
  fail_acks: Arc<AtomicBool>,
  connected: AtomicBool,
  publish_delay: Mutex<Option<Duration>>,
}

impl Default for InMemoryQueue {
  fn default() -> Self {
    Self::new()
  }
}

impl InMemoryQueue {
  pub fn new() -> Self {
    let (sender, receiver) = mpsc::unbounded_channel();
    Self {
      sender: Mutex::new(Some(sender)),
      receiver: Mutex::new(Some(receiver)),
      published: Mutex::new(Vec::new()),
      publish_attempts: AtomicUsize::new(0),
      acked: Arc::new(AtomicUsize::new(0)),
      fail_acks: Arc::new(AtomicBool::new(false)),
      connected: AtomicBool::new(true),
      publish_delay: Mutex::new(None),
    }
  }

  /// Simulates losing (or regaining) the broker connection. Publishes fail
  /// while disconnected.
  pub fn set_connected(&self, connected: bool) {
    self.connected.store(connected, Ordering::SeqCst);
  }

  /// Makes every publish wait before being accepted.
  pub fn set_publish_delay(&self, delay: Option<Duration>) {
    *self.publish_delay.lock() = delay;
  }

  /// Makes acknowledgements of subsequently yielded deliveries fail.
  pub fn set_ack_failure(&self, fail: bool) {
    self.fail_acks.store(fail, Ordering::SeqCst);
  }

  /// Queues a stream error behind the current backlog. The delivery stream
  /// yields it in order, as a broker failure mid-stream would surface.
  pub fn fail_stream(&self, err: TransportError) -> Result<(), TransportError> {
    let sender = self.sender.lock().clone().ok_or(TransportError::Closed)?;
    sender.send(Err(err)).map_err(|_| TransportError::Closed)
  }

  /// Closes the queue: the delivery stream ends once the backlog is drained.
  pub fn close(&self) {
    self.sender.lock().take();
  }

  pub fn published(&self) -> Vec<Vec<u8>> {
    self.published.lock().clone()
  }

  pub fn published_count(&self) -> usize {
    self.published.lock().len()
  }

  pub fn publish_attempts(&self) -> usize {
    self.publish_attempts.load(Ordering::SeqCst)
  }

  pub fn acked_count(&self) -> usize {
    self.acked.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl QueueTransport for InMemoryQueue {
  async fn publish(&self, body: Vec<u8>) -> Result<(), TransportError> {
    self.publish_attempts.fetch_add(1, Ordering::SeqCst);

    let delay = *self.publish_delay.lock();
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }

    if !self.connected.load(Ordering::SeqCst) {
      return Err(TransportError::Disconnected);
    }

    let sender = self.sender.lock().clone();
    match sender {
      Some(sender) => {
        sender.send(Ok(body.clone())).map_err(|_| TransportError::Closed)?;
        self.published.lock().push(body);
        Ok(())
      }
      None => Err(TransportError::Closed),
    }
  }

  async fn deliveries(&self) -> Result<DeliveryStream, TransportError> {
    let receiver = self.receiver.lock().take().ok_or(TransportError::Closed)?;
    let acked = self.acked.clone();
    let fail_acks = self.fail_acks.clone();

    let deliveries = stream::unfold(receiver, move |mut receiver| {
      let acked = acked.clone();
      let fail_acks = fail_acks.clone();
      async move {
        let item = match receiver.recv().await? {
          Ok(body) if fail_acks.load(Ordering::SeqCst) => Ok(Delivery::new(body, Box::new(FailingAck))),
          Ok(body) => Ok(Delivery::new(body, Box::new(CountingAck(acked)))),
          Err(e) => Err(e),
        };
        Some((item, receiver))
      }
    });
    Ok(deliveries.boxed())
  }

  fn is_connected(&self) -> bool {
    self.connected.load(Ordering::SeqCst)
  }
}

struct CountingAck(Arc<AtomicUsize>);

#[async_trait]
impl Acknowledge for CountingAck {
  async fn ack(self: Box<Self>) -> Result<(), TransportError> {
    self.0.fetch_add(1, Ordering::SeqCst);
    Ok(())
  }
}

struct FailingAck;

#[async_trait]
impl Acknowledge for FailingAck {
  async fn ack(self: Box<Self>) -> Result<(), TransportError> {
    Err(TransportError::Ack("ack rejected by the queue".to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn delivers_in_publish_order_and_ends_on_close() {
    let queue = InMemoryQueue::new();
    queue.publish(b"first".to_vec()).await.unwrap();
    queue.publish(b"second".to_vec()).await.unwrap();
    queue.close();

    let mut deliveries = queue.deliveries().await.unwrap();
    let mut first = deliveries.next().await.unwrap().unwrap();
    assert_eq!(first.body(), b"first");
    first.ack().await.unwrap();
    first.ack().await.unwrap();
    assert_eq!(queue.acked_count(), 1);

    let second = deliveries.next().await.unwrap().unwrap();
    assert_eq!(second.into_body(), b"second".to_vec());
    assert!(deliveries.next().await.is_none());
  }

  #[tokio::test]
  async fn disconnected_queue_rejects_publish() {
    let queue = InMemoryQueue::new();
    queue.set_connected(false);
    assert_eq!(queue.publish(b"x".to_vec()).await, Err(TransportError::Disconnected));
    assert_eq!(queue.publish_attempts(), 1);
    assert_eq!(queue.published_count(), 0);
  }

  #[tokio::test]
  async fn delivery_stream_can_only_be_taken_once() {
    let queue = InMemoryQueue::new();
    assert!(queue.deliveries().await.is_ok());
    assert!(matches!(queue.deliveries().await, Err(TransportError::Closed)));
  }

  #[tokio::test]
  async fn failing_acks_are_reported_and_not_counted() {
    let queue = InMemoryQueue::new();
    queue.set_ack_failure(true);
    queue.publish(b"x".to_vec()).await.unwrap();

    let mut deliveries = queue.deliveries().await.unwrap();
    let mut delivery = deliveries.next().await.unwrap().unwrap();
    assert!(matches!(delivery.ack().await, Err(TransportError::Ack(_))));
    assert_eq!(queue.acked_count(), 0);
  }

  #[tokio::test]
  async fn stream_error_is_yielded_in_order() {
    let queue = InMemoryQueue::new();
    queue.publish(b"before".to_vec()).await.unwrap();
    queue.fail_stream(TransportError::Stream("lost".to_string())).unwrap();
    queue.publish(b"after".to_vec()).await.unwrap();

    let mut deliveries = queue.deliveries().await.unwrap();
    assert_eq!(deliveries.next().await.unwrap().unwrap().body(), b"before");
    assert_eq!(deliveries.next().await.unwrap().unwrap_err(), TransportError::Stream("lost".to_string()));
    assert_eq!(deliveries.next().await.unwrap().unwrap().body(), b"after");
  }
}
