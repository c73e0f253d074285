// orderflow/src/store/mod.rs

//! The relational store holding committed orders.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use std::time::Duration;
use thiserror::Error;

use crate::message::OrderMessage;

pub use memory::InMemoryOrderStore;
pub use postgres::PgOrderStore;

/// Row count shown by the listing views.
pub const RECENT_ORDERS_LIMIT: i64 = 50;

/// A persisted order. Created once per committed message, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct OrderRecord {
  pub order_id: String,
  pub created_at: DateTime<Utc>,
  pub quantity: i32,
}

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("order '{order_id}' already exists")]
  Duplicate { order_id: String },

  #[error("store operation timed out after {0:?}")]
  Timeout(Duration),

  #[error("quantity {quantity} of order '{order_id}' does not fit the quantity column")]
  QuantityOutOfRange { order_id: String, quantity: i64 },

  #[error("store is unavailable: {0}")]
  Unavailable(String),

  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),
}

/// Narrows a message quantity to the `INTEGER` column.
pub fn column_quantity(message: &OrderMessage) -> Result<i32, StoreError> {
  i32::try_from(message.quantity).map_err(|_| StoreError::QuantityOutOfRange {
    order_id: message.order_id.clone(),
    quantity: message.quantity,
  })
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Inserts a new record. A second insert of the same `order_id` is a
  /// `StoreError::Duplicate`, never a silent no-op.
  async fn insert_order(&self, message: &OrderMessage) -> Result<(), StoreError>;

  /// Newest records first.
  async fn list_recent_orders(&self, limit: i64) -> Result<Vec<OrderRecord>, StoreError>;

  /// Cheap round trip used by readiness probes.
  async fn ping(&self) -> Result<(), StoreError>;
}
