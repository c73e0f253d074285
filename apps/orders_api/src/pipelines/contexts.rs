// apps/orders_api/src/pipelines/contexts.rs

use orderflow::{OrderCreateRequest, OrderPublisher};

/// Data for one `POST /orders` run.
#[derive(Clone)]
pub struct IngestCtxData {
  pub publisher: OrderPublisher,
  pub body: Vec<u8>,
  pub request: Option<OrderCreateRequest>,
}

impl IngestCtxData {
  pub fn new(publisher: OrderPublisher, body: Vec<u8>) -> Self {
    Self {
      publisher,
      body,
      request: None,
    }
  }
}
