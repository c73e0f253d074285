// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use async_trait::async_trait;
use orderflow::{
  ConsumerMetrics, ContextData, InMemoryOrderStore, InMemoryQueue, OrderConsumer, OrderMessage, OrderRecord,
  OrderStore, PipelineControl, PipelineError, StoreError,
};
use parking_lot::Mutex;
use prometheus::Registry;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

// --- Generic pipeline fixtures ---
#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub message: String,
  pub steps_executed: Vec<String>,
  pub should_stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("pipeline error: {0}")]
  Pipeline(#[from] PipelineError),

  #[error("test handler failed: {0}")]
  Handler(String),
}

pub fn create_simple_handler(
  step_name: &'static str,
  message_to_append: &'static str,
) -> orderflow::Handler<TestContext, TestError> {
  Box::new(move |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.message.push_str(message_to_append);
      guard.steps_executed.push(step_name.to_string());
      tracing::debug!(target: "test_handlers", step = step_name, counter = guard.counter, "executed");
      if guard.should_stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn create_failing_handler(
  step_name: &'static str,
  error_message: &'static str,
) -> orderflow::Handler<TestContext, TestError> {
  Box::new(move |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      Err(TestError::Handler(error_message.to_string()))
    })
  })
}

// --- Order flow fixtures ---

/// A worker wired to in-memory collaborators, with handles kept for assertions.
pub struct WorkerHarness {
  pub queue: Arc<InMemoryQueue>,
  pub store: Arc<InMemoryOrderStore>,
  pub consumer: OrderConsumer,
}

pub fn worker_harness() -> WorkerHarness {
  worker_harness_with_timeout(Duration::from_secs(2))
}

pub fn worker_harness_with_timeout(insert_timeout: Duration) -> WorkerHarness {
  let queue = Arc::new(InMemoryQueue::new());
  let store = Arc::new(InMemoryOrderStore::new());
  let metrics = ConsumerMetrics::new(&Registry::new()).expect("metrics register");
  let consumer = OrderConsumer::new(queue.clone(), store.clone(), metrics, insert_timeout);
  WorkerHarness { queue, store, consumer }
}

/// Store that records how many deliveries the queue had acknowledged at the
/// moment each insert arrived.
pub struct AckObservingStore {
  pub queue: Arc<InMemoryQueue>,
  pub inner: InMemoryOrderStore,
  pub acked_at_insert: Mutex<Vec<usize>>,
}

impl AckObservingStore {
  pub fn new(queue: Arc<InMemoryQueue>) -> Self {
    Self {
      queue,
      inner: InMemoryOrderStore::new(),
      acked_at_insert: Mutex::new(Vec::new()),
    }
  }
}

#[async_trait]
impl OrderStore for AckObservingStore {
  async fn insert_order(&self, message: &OrderMessage) -> Result<(), StoreError> {
    self.acked_at_insert.lock().push(self.queue.acked_count());
    self.inner.insert_order(message).await
  }

  async fn list_recent_orders(&self, limit: i64) -> Result<Vec<OrderRecord>, StoreError> {
    self.inner.list_recent_orders(limit).await
  }

  async fn ping(&self) -> Result<(), StoreError> {
    self.inner.ping().await
  }
}

// --- Helper for Tracing Setup ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
