// orderflow/src/outcome.rs

//! Terminal classifications counted on both sides of the queue.

use std::fmt;

/// Terminal state of one dequeued message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageOutcome {
  /// Decoded and committed to the store.
  Ok,
  /// Discarded: the body was not a valid order message.
  DecodeError,
  /// Discarded: the insert timed out, hit a constraint or lost its connection.
  DbError,
}

impl MessageOutcome {
  pub const ALL: [MessageOutcome; 3] = [MessageOutcome::Ok, MessageOutcome::DecodeError, MessageOutcome::DbError];

  pub fn as_str(&self) -> &'static str {
    match self {
      MessageOutcome::Ok => "ok",
      MessageOutcome::DecodeError => "decode_error",
      MessageOutcome::DbError => "db_error",
    }
  }
}

impl fmt::Display for MessageOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Outcome of one order-creation request at the ingress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngressOutcome {
  Accepted,
  InvalidInput,
  PublishFailed,
}

impl IngressOutcome {
  pub const ALL: [IngressOutcome; 3] = [
    IngressOutcome::Accepted,
    IngressOutcome::InvalidInput,
    IngressOutcome::PublishFailed,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      IngressOutcome::Accepted => "accepted",
      IngressOutcome::InvalidInput => "invalid_input",
      IngressOutcome::PublishFailed => "publish_failed",
    }
  }
}

impl fmt::Display for IngressOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
