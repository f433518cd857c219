//! Stampede: Synthetic Load Generation for Feature Serving
//!
//! Generates plausible feature-lookup traffic against a remote serving
//! backend: value pools are materialized once from a declarative load
//! specification, and every trigger samples fresh randomized request
//! batches from them and dispatches the batch concurrently.

pub mod assembler;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod pool;
pub mod sampler;
pub mod server;
pub mod spec;
pub mod types;
