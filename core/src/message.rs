// orderflow/src/message.rs

//! The order message contract shared by the ingress and the worker.
//!
//! Wire format of a queued order (UTF-8 JSON):
//!
//! ```text
//! {"order_id": "<string>", "quantity": <integer, optional, default 1>}
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Quantity assumed when the wire payload carries none.
pub const DEFAULT_QUANTITY: i64 = 1;

/// Rejection of an inbound order-creation request.
#[derive(Debug, Error)]
pub enum ValidationError {
  #[error("request body is not a valid order request: {0}")]
  Malformed(#[from] serde_json::Error),

  #[error("order_id must not be empty")]
  EmptyOrderId,
}

/// Failure to turn a dequeued body into an `OrderMessage`.
#[derive(Debug, Error)]
pub enum DecodeError {
  #[error("message body is not a valid order message: {0}")]
  Malformed(#[from] serde_json::Error),

  #[error("order message has an empty order_id")]
  EmptyOrderId,
}

/// Caller-supplied order creation request. Lives for one HTTP request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreateRequest {
  pub order_id: String,
}

impl OrderCreateRequest {
  pub fn new(order_id: impl Into<String>) -> Self {
    Self {
      order_id: order_id.into(),
    }
  }

  /// Parses and validates a request body. Unknown fields are ignored.
  pub fn decode(body: &[u8]) -> Result<Self, ValidationError> {
    let request: OrderCreateRequest = serde_json::from_slice(body)?;
    request.validate()?;
    Ok(request)
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.order_id.is_empty() {
      return Err(ValidationError::EmptyOrderId);
    }
    Ok(())
  }
}

/// The durable unit of work placed on the queue. Immutable once published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderMessage {
  pub order_id: String,
  /// Wide on the wire; the store enforces its own column range.
  pub quantity: i64,
}

// Accepts a missing or `null` quantity.
#[derive(Deserialize)]
struct OrderMessageWire {
  order_id: String,
  #[serde(default)]
  quantity: Option<i64>,
}

impl OrderMessage {
  pub fn new(order_id: impl Into<String>, quantity: i64) -> Self {
    Self {
      order_id: order_id.into(),
      quantity,
    }
  }

  /// The ingress path does not collect a quantity, so every published
  /// message carries the default.
  pub fn from_request(request: &OrderCreateRequest) -> Self {
    Self::new(request.order_id.clone(), DEFAULT_QUANTITY)
  }

  pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(self)
  }

  pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
    let wire: OrderMessageWire = serde_json::from_slice(body)?;
    if wire.order_id.is_empty() {
      return Err(DecodeError::EmptyOrderId);
    }
    Ok(Self {
      order_id: wire.order_id,
      quantity: wire.quantity.unwrap_or(DEFAULT_QUANTITY),
    })
  }
}
