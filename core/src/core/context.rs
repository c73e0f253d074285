// orderflow/src/core/context.rs

//! The `Handler<TData, Err>` type for pipeline step handlers.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use std::future::Future;
use std::pin::Pin;

/// A boxed asynchronous step handler.
///
/// A handler receives a clone of the run's `ContextData<TData>`, reads or
/// writes it (dropping every guard before awaiting), does its I/O and returns
/// `PipelineControl::Continue` or `PipelineControl::Stop`.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>
    + Send
    + Sync,
>;
