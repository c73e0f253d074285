// orderflow/src/metrics.rs

//! Prometheus counters for both sides of the queue.
//!
//! Each process creates one `Registry` at startup and hands it to the
//! constructors below; nothing registers into the default global registry.

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::outcome::{IngressOutcome, MessageOutcome};

/// Counters owned by the ingress service.
#[derive(Debug, Clone)]
pub struct IngressMetrics {
  pub http_requests_total: IntCounterVec,
  pub http_request_duration_seconds: HistogramVec,
  pub orders_published_total: IntCounter,
  pub orders_publish_failures_total: IntCounter,
  pub create_outcomes_total: IntCounterVec,
}

impl IngressMetrics {
  pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
    let http_requests_total = IntCounterVec::new(
      Opts::new("orders_http_requests_total", "Total HTTP requests received by orders-api"),
      &["handler", "method", "code"],
    )?;
    let http_request_duration_seconds = HistogramVec::new(
      HistogramOpts::new(
        "orders_http_request_duration_seconds",
        "Duration of HTTP requests for orders-api",
      ),
      &["handler", "method"],
    )?;
    let orders_published_total = IntCounter::new(
      "orders_published_total",
      "Total number of orders published to the queue",
    )?;
    let orders_publish_failures_total = IntCounter::new(
      "orders_publish_failures_total",
      "Total number of failures publishing orders to the queue",
    )?;
    let create_outcomes_total = IntCounterVec::new(
      Opts::new("orders_create_outcomes_total", "Order creation requests by outcome"),
      &["outcome"],
    )?;

    registry.register(Box::new(http_requests_total.clone()))?;
    registry.register(Box::new(http_request_duration_seconds.clone()))?;
    registry.register(Box::new(orders_published_total.clone()))?;
    registry.register(Box::new(orders_publish_failures_total.clone()))?;
    registry.register(Box::new(create_outcomes_total.clone()))?;

    // Expose every outcome series at zero from the start.
    for outcome in IngressOutcome::ALL {
      create_outcomes_total.with_label_values(&[outcome.as_str()]);
    }

    Ok(Self {
      http_requests_total,
      http_request_duration_seconds,
      orders_published_total,
      orders_publish_failures_total,
      create_outcomes_total,
    })
  }

  pub fn record_outcome(&self, outcome: IngressOutcome) {
    self.create_outcomes_total.with_label_values(&[outcome.as_str()]).inc();
    match outcome {
      IngressOutcome::Accepted => self.orders_published_total.inc(),
      IngressOutcome::PublishFailed => self.orders_publish_failures_total.inc(),
      IngressOutcome::InvalidInput => {}
    }
  }

  pub fn outcome_count(&self, outcome: IngressOutcome) -> u64 {
    self.create_outcomes_total.with_label_values(&[outcome.as_str()]).get()
  }

  pub fn observe_request(&self, handler: &str, method: &str, code: u16, seconds: f64) {
    let code = code.to_string();
    self
      .http_request_duration_seconds
      .with_label_values(&[handler, method])
      .observe(seconds);
    self
      .http_requests_total
      .with_label_values(&[handler, method, code.as_str()])
      .inc();
  }
}

/// Counters owned by the worker.
#[derive(Debug, Clone)]
pub struct ConsumerMetrics {
  pub messages_total: IntCounterVec,
  pub db_errors_total: IntCounter,
}

impl ConsumerMetrics {
  pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
    let messages_total = IntCounterVec::new(
      Opts::new("orders_worker_messages_total", "Total messages processed by the worker"),
      &["status"],
    )?;
    let db_errors_total = IntCounter::new("orders_worker_db_errors_total", "Total DB errors in worker")?;

    registry.register(Box::new(messages_total.clone()))?;
    registry.register(Box::new(db_errors_total.clone()))?;

    for outcome in MessageOutcome::ALL {
      messages_total.with_label_values(&[outcome.as_str()]);
    }

    Ok(Self {
      messages_total,
      db_errors_total,
    })
  }

  pub fn record(&self, outcome: MessageOutcome) {
    self.messages_total.with_label_values(&[outcome.as_str()]).inc();
    if outcome == MessageOutcome::DbError {
      self.db_errors_total.inc();
    }
  }

  pub fn count(&self, outcome: MessageOutcome) -> u64 {
    self.messages_total.with_label_values(&[outcome.as_str()]).get()
  }
}

/// Renders a registry in the Prometheus text exposition format.
pub fn render(registry: &Registry) -> Result<String, prometheus::Error> {
  let mut buffer = Vec::new();
  TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
  String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// Content type of `render`'s output.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn consumer_db_errors_feed_both_counters() {
    let registry = Registry::new();
    let metrics = ConsumerMetrics::new(&registry).unwrap();
    metrics.record(MessageOutcome::DbError);
    metrics.record(MessageOutcome::Ok);

    assert_eq!(metrics.count(MessageOutcome::DbError), 1);
    assert_eq!(metrics.count(MessageOutcome::Ok), 1);
    assert_eq!(metrics.count(MessageOutcome::DecodeError), 0);
    assert_eq!(metrics.db_errors_total.get(), 1);
  }

  #[test]
  fn render_exposes_zeroed_outcome_series() {
    let registry = Registry::new();
    let metrics = IngressMetrics::new(&registry).unwrap();
    metrics.record_outcome(IngressOutcome::Accepted);

    let text = render(&registry).unwrap();
    assert!(text.contains(r#"orders_create_outcomes_total{outcome="accepted"} 1"#));
    assert!(text.contains(r#"orders_create_outcomes_total{outcome="invalid_input"} 0"#));
    assert!(text.contains("orders_published_total 1"));
  }

  #[test]
  fn registering_twice_in_one_registry_fails() {
    let registry = Registry::new();
    ConsumerMetrics::new(&registry).unwrap();
    assert!(ConsumerMetrics::new(&registry).is_err());
  }
}
