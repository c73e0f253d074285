// src/lib.rs

//! Orderflow: asynchronous order ingestion over a durable queue.
//!
//! Two processes share this crate:
//!  - The ingress validates `POST /orders` bodies and publishes an
//!    `OrderMessage` through an `OrderPublisher`.
//!  - The worker drains the queue with an `OrderConsumer`, acknowledging each
//!    delivery on receipt and inserting one row per order.
//!
//! Both sides run their per-request work through a small named-step
//! `Pipeline`, and both count outcomes into a process-local Prometheus
//! registry (see `metrics`).

pub mod consumer;
pub mod core;
pub mod error;
pub mod message;
pub mod metrics;
pub mod outcome;
pub mod pipeline;
pub mod publisher;
pub mod readiness;
pub mod store;
pub mod transport;

// --- Re-exports for the Public API ---

pub use crate::core::context::Handler;
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::StepDef;

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::PipelineError;

pub use crate::consumer::{ConsumeError, OrderConsumer};
pub use crate::message::{DecodeError, OrderCreateRequest, OrderMessage, ValidationError};
pub use crate::metrics::{ConsumerMetrics, IngressMetrics};
pub use crate::outcome::{IngressOutcome, MessageOutcome};
pub use crate::publisher::{OrderPublisher, PublishError};
pub use crate::readiness::NotReady;
pub use crate::store::{InMemoryOrderStore, OrderRecord, OrderStore, PgOrderStore, StoreError};
pub use crate::transport::{InMemoryQueue, NatsTransport, QueueBinding, QueueTransport, TransportError};
