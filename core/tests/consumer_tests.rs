// tests/consumer_tests.rs
mod common;

use common::*;
use orderflow::consumer::classify;
use orderflow::{
  ConsumeError, ConsumerMetrics, InMemoryQueue, MessageOutcome, OrderConsumer, OrderCreateRequest, OrderPublisher,
  OrderStore, PipelineError, PipelineResult, QueueTransport, StoreError, TransportError,
};
use prometheus::Registry;
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
#[serial]
async fn test_valid_message_is_inserted_with_its_quantity() {
  setup_tracing();
  let h = worker_harness();

  let outcome = h.consumer.process(br#"{"order_id":"W-1","quantity":4}"#.to_vec()).await;

  assert_eq!(outcome, MessageOutcome::Ok);
  assert_eq!(h.store.get("W-1").unwrap().quantity, 4);
  assert_eq!(h.consumer.metrics().count(MessageOutcome::Ok), 1);
}

#[tokio::test]
#[serial]
async fn test_missing_quantity_defaults_to_one() {
  setup_tracing();
  let h = worker_harness();

  assert_eq!(h.consumer.process(br#"{"order_id":"W-2"}"#.to_vec()).await, MessageOutcome::Ok);
  assert_eq!(h.store.get("W-2").unwrap().quantity, 1);
}

#[tokio::test]
#[serial]
async fn test_undecodable_body_inserts_nothing() {
  setup_tracing();
  let h = worker_harness();

  for body in [&b"not json"[..], &br#"{"quantity":2}"#[..], &br#"{"order_id":""}"#[..]] {
    assert_eq!(h.consumer.process(body.to_vec()).await, MessageOutcome::DecodeError);
  }

  assert!(h.store.is_empty());
  assert_eq!(h.consumer.metrics().count(MessageOutcome::DecodeError), 3);
  assert_eq!(h.consumer.metrics().db_errors_total.get(), 0);
}

#[tokio::test]
#[serial]
async fn test_duplicate_order_id_is_a_db_error_and_keeps_first_row() {
  setup_tracing();
  let h = worker_harness();

  assert_eq!(h.consumer.process(br#"{"order_id":"D-1","quantity":1}"#.to_vec()).await, MessageOutcome::Ok);
  assert_eq!(h.consumer.process(br#"{"order_id":"D-1","quantity":9}"#.to_vec()).await, MessageOutcome::DbError);

  assert_eq!(h.store.len(), 1);
  assert_eq!(h.store.get("D-1").unwrap().quantity, 1);
  assert_eq!(h.consumer.metrics().count(MessageOutcome::DbError), 1);
  assert_eq!(h.consumer.metrics().db_errors_total.get(), 1);
}

#[tokio::test]
#[serial]
async fn test_unavailable_store_is_a_db_error() {
  setup_tracing();
  let h = worker_harness();
  h.store.set_available(false);

  assert_eq!(h.consumer.process(br#"{"order_id":"X-1"}"#.to_vec()).await, MessageOutcome::DbError);
  assert!(h.store.ping().await.is_err());
}

#[tokio::test]
#[serial]
async fn test_slow_insert_is_cut_off_by_the_insert_timeout() {
  setup_tracing();
  let h = worker_harness_with_timeout(Duration::from_millis(20));
  h.store.set_insert_delay(Some(Duration::from_millis(300)));

  assert_eq!(h.consumer.process(br#"{"order_id":"S-1"}"#.to_vec()).await, MessageOutcome::DbError);
}

#[tokio::test]
#[serial]
async fn test_run_acks_each_delivery_before_processing_it() {
  setup_tracing();
  let queue = Arc::new(InMemoryQueue::new());
  let store = Arc::new(AckObservingStore::new(queue.clone()));
  let consumer = OrderConsumer::new(
    queue.clone(),
    store.clone(),
    ConsumerMetrics::new(&Registry::new()).unwrap(),
    Duration::from_secs(2),
  );

  for id in ["K-1", "K-2", "K-3"] {
    queue.publish(format!(r#"{{"order_id":"{id}"}}"#).into_bytes()).await.unwrap();
  }
  queue.close();

  assert_eq!(consumer.run().await.unwrap(), 3);
  assert_eq!(*store.acked_at_insert.lock(), vec![1, 2, 3]);
}

#[tokio::test]
#[serial]
async fn test_failed_deliveries_are_acked_and_not_redelivered() {
  setup_tracing();
  let h = worker_harness();
  h.store.set_available(false);

  h.queue.publish(br#"{"order_id":"L-1"}"#.to_vec()).await.unwrap();
  h.queue.publish(b"garbage".to_vec()).await.unwrap();
  h.queue.close();

  assert_eq!(h.consumer.run().await.unwrap(), 2);
  assert_eq!(h.queue.acked_count(), 2);
  assert!(h.store.is_empty());
  assert_eq!(h.consumer.metrics().count(MessageOutcome::DbError), 1);
  assert_eq!(h.consumer.metrics().count(MessageOutcome::DecodeError), 1);
}

#[tokio::test]
#[serial]
async fn test_ack_failure_is_logged_and_the_delivery_still_processed() {
  setup_tracing();
  let h = worker_harness();
  h.queue.set_ack_failure(true);

  h.queue.publish(br#"{"order_id":"N-1","quantity":2}"#.to_vec()).await.unwrap();
  h.queue.close();

  assert_eq!(h.consumer.run().await.unwrap(), 1);
  assert_eq!(h.queue.acked_count(), 0);
  assert_eq!(h.store.get("N-1").unwrap().quantity, 2);
  assert_eq!(h.consumer.metrics().count(MessageOutcome::Ok), 1);
}

#[tokio::test]
#[serial]
async fn test_stream_error_ends_run_before_later_deliveries() {
  setup_tracing();
  let h = worker_harness();

  h.queue.publish(br#"{"order_id":"E-1"}"#.to_vec()).await.unwrap();
  h.queue.fail_stream(TransportError::Stream("connection reset".to_string())).unwrap();
  h.queue.publish(br#"{"order_id":"E-2"}"#.to_vec()).await.unwrap();
  h.queue.close();

  let err = h.consumer.run().await.unwrap_err();
  assert_eq!(err, TransportError::Stream("connection reset".to_string()));
  assert_eq!(h.store.len(), 1);
  assert!(h.store.get("E-1").is_some());
  assert!(h.store.get("E-2").is_none());
  assert_eq!(h.queue.acked_count(), 1);
  assert_eq!(h.consumer.metrics().count(MessageOutcome::Ok), 1);
}

#[tokio::test]
#[serial]
async fn test_quantity_beyond_the_column_range_is_a_db_error() {
  setup_tracing();
  let h = worker_harness();

  let outcome = h.consumer.process(br#"{"order_id":"Q-1","quantity":3000000000}"#.to_vec()).await;

  assert_eq!(outcome, MessageOutcome::DbError);
  assert!(h.store.is_empty());
  assert_eq!(h.consumer.metrics().count(MessageOutcome::DecodeError), 0);
}

#[tokio::test]
#[serial]
async fn test_run_returns_when_the_delivery_stream_closes() {
  setup_tracing();
  let h = worker_harness();
  h.queue.close();

  let processed = tokio::time::timeout(Duration::from_secs(1), h.consumer.run())
    .await
    .expect("run should end once the stream is closed")
    .unwrap();
  assert_eq!(processed, 0);
}

#[tokio::test]
#[serial]
async fn test_published_order_reaches_the_store() {
  setup_tracing();
  let h = worker_harness();
  let publisher = OrderPublisher::new(h.queue.clone(), Duration::from_secs(5));

  publisher.publish(&OrderCreateRequest::new("A-100")).await.unwrap();
  h.queue.close();
  h.consumer.run().await.unwrap();

  let listed = h.store.list_recent_orders(50).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].order_id, "A-100");
  assert_eq!(listed[0].quantity, 1);
}

#[test]
fn test_classify_maps_results_to_outcomes() {
  assert_eq!(classify(&Ok(PipelineResult::Completed)), MessageOutcome::Ok);
  assert_eq!(classify(&Ok(PipelineResult::Stopped)), MessageOutcome::DecodeError);
  assert_eq!(
    classify(&Err(ConsumeError::Store(StoreError::Timeout(Duration::from_secs(2))))),
    MessageOutcome::DbError
  );
  assert_eq!(
    classify(&Err(ConsumeError::Pipeline(PipelineError::HandlerMissing {
      step_name: "persist_order_record".to_string()
    }))),
    MessageOutcome::DbError
  );
}
