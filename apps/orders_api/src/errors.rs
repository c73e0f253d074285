// apps/orders_api/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use orderflow::{IngressOutcome, PipelineError, PublishError, StoreError, ValidationError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Invalid order payload: {0}")]
  InvalidPayload(#[from] ValidationError),

  #[error("Publish failed: {0}")]
  Publish(#[from] PublishError),

  #[error("Database Error: {0}")]
  Store(#[from] StoreError),

  #[error("Pipeline Error: {0}")]
  Pipeline(#[from] PipelineError),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// How a failed `POST /orders` is counted.
  pub fn ingress_outcome(&self) -> IngressOutcome {
    match self {
      AppError::InvalidPayload(_) => IngressOutcome::InvalidInput,
      _ => IngressOutcome::PublishFailed,
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
      AppError::Publish(e) if e.is_upstream() => StatusCode::BAD_GATEWAY,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    tracing::debug!(application_error = %self, "Responding with error");
    let message = match self {
      AppError::InvalidPayload(_) => "invalid payload",
      AppError::Publish(_) => "publish failed",
      AppError::Store(_) => "DB error",
      AppError::Pipeline(_) | AppError::Config(_) | AppError::Internal(_) => "internal error",
    };
    HttpResponse::build(self.status_code()).json(json!({ "error": message }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
