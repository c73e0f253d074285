// tests/publisher_tests.rs
mod common;

use common::*;
use orderflow::{InMemoryQueue, OrderCreateRequest, OrderMessage, OrderPublisher, PublishError, TransportError};
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;

fn publisher_over(queue: &Arc<InMemoryQueue>, timeout: Duration) -> OrderPublisher {
  OrderPublisher::new(queue.clone(), timeout)
}

#[tokio::test]
#[serial]
async fn test_publish_enqueues_one_message_with_default_quantity() {
  setup_tracing();
  let queue = Arc::new(InMemoryQueue::new());
  let publisher = publisher_over(&queue, Duration::from_secs(5));

  publisher.publish(&OrderCreateRequest::new("A-100")).await.unwrap();

  let published = queue.published();
  assert_eq!(published.len(), 1);
  assert_eq!(published[0], br#"{"order_id":"A-100","quantity":1}"#.to_vec());
  assert_eq!(OrderMessage::decode(&published[0]).unwrap(), OrderMessage::new("A-100", 1));
}

#[tokio::test]
#[serial]
async fn test_publish_fails_when_transport_is_disconnected() {
  setup_tracing();
  let queue = Arc::new(InMemoryQueue::new());
  queue.set_connected(false);
  let publisher = publisher_over(&queue, Duration::from_secs(5));

  let err = publisher.publish(&OrderCreateRequest::new("A-1")).await.unwrap_err();
  assert!(matches!(err, PublishError::Transport(TransportError::Disconnected)));
  assert!(err.is_upstream());
  assert!(!publisher.is_connected());
  assert_eq!(queue.published_count(), 0);
}

#[tokio::test]
#[serial]
async fn test_publish_times_out_on_a_stalled_transport() {
  setup_tracing();
  let queue = Arc::new(InMemoryQueue::new());
  queue.set_publish_delay(Some(Duration::from_millis(500)));
  let publisher = publisher_over(&queue, Duration::from_millis(20));

  let err = publisher.publish(&OrderCreateRequest::new("slow")).await.unwrap_err();
  assert!(matches!(err, PublishError::Timeout(d) if d == Duration::from_millis(20)));
  assert_eq!(queue.publish_attempts(), 1);
}

#[tokio::test]
#[serial]
async fn test_detached_publish_survives_a_dropped_caller() {
  setup_tracing();
  let queue = Arc::new(InMemoryQueue::new());
  queue.set_publish_delay(Some(Duration::from_millis(50)));
  let publisher = publisher_over(&queue, Duration::from_secs(5));

  let caller = tokio::spawn({
    let publisher = publisher.clone();
    async move { publisher.publish_detached(OrderCreateRequest::new("detached")).await }
  });
  tokio::time::sleep(Duration::from_millis(10)).await;
  caller.abort();

  tokio::time::sleep(Duration::from_millis(150)).await;
  assert_eq!(queue.published_count(), 1);
}

#[tokio::test]
#[serial]
async fn test_concurrent_publishes_share_one_transport() {
  setup_tracing();
  let queue = Arc::new(InMemoryQueue::new());
  let publisher = publisher_over(&queue, Duration::from_secs(5));

  let tasks: Vec<_> = (0..20)
    .map(|i| {
      let publisher = publisher.clone();
      tokio::spawn(async move { publisher.publish(&OrderCreateRequest::new(format!("C-{i}"))).await })
    })
    .collect();
  for task in tasks {
    task.await.unwrap().unwrap();
  }
  assert_eq!(queue.published_count(), 20);
}
