// orderflow/src/store/memory.rs

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::{column_quantity, OrderRecord, OrderStore, StoreError};
use crate::message::OrderMessage;

/// In-process `OrderStore` enforcing the `order_id` primary key.
pub struct InMemoryOrderStore {
  records: Mutex<HashMap<String, OrderRecord>>,
  available: AtomicBool,
  insert_delay: Mutex<Option<Duration>>,
}

impl Default for InMemoryOrderStore {
  fn default() -> Self {
    Self::new()
  }
}

impl InMemoryOrderStore {
  pub fn new() -> Self {
    Self {
      records: Mutex::new(HashMap::new()),
      available: AtomicBool::new(true),
      insert_delay: Mutex::new(None),
    }
  }

  /// While unavailable every operation fails with `StoreError::Unavailable`.
  pub fn set_available(&self, available: bool) {
    self.available.store(available, Ordering::SeqCst);
  }

  pub fn set_insert_delay(&self, delay: Option<Duration>) {
    *self.insert_delay.lock() = delay;
  }

  pub fn get(&self, order_id: &str) -> Option<OrderRecord> {
    self.records.lock().get(order_id).cloned()
  }

  pub fn len(&self) -> usize {
    self.records.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.lock().is_empty()
  }

  fn check_available(&self) -> Result<(), StoreError> {
    if self.available.load(Ordering::SeqCst) {
      Ok(())
    } else {
      Err(StoreError::Unavailable("in-memory store switched off".to_string()))
    }
  }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
  async fn insert_order(&self, message: &OrderMessage) -> Result<(), StoreError> {
    let delay = *self.insert_delay.lock();
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }
    self.check_available()?;
    let quantity = column_quantity(message)?;

    let mut records = self.records.lock();
    if records.contains_key(&message.order_id) {
      return Err(StoreError::Duplicate {
        order_id: message.order_id.clone(),
      });
    }
    // Keep created_at strictly increasing so newest-first ordering is stable.
    let created_at = records
      .values()
      .map(|r| r.created_at)
      .max()
      .map_or_else(Utc::now, |latest| (latest + ChronoDuration::microseconds(1)).max(Utc::now()));
    records.insert(
      message.order_id.clone(),
      OrderRecord {
        order_id: message.order_id.clone(),
        created_at,
        quantity,
      },
    );
    Ok(())
  }

  async fn list_recent_orders(&self, limit: i64) -> Result<Vec<OrderRecord>, StoreError> {
    self.check_available()?;
    let mut records: Vec<OrderRecord> = self.records.lock().values().cloned().collect();
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    records.truncate(usize::try_from(limit).unwrap_or(0));
    Ok(records)
  }

  async fn ping(&self) -> Result<(), StoreError> {
    self.check_available()
  }
}
