//! Slideshow pipeline orchestration.
//!
//! This crate provides:
//! - Pipeline configuration from defaults, environment and CLI flags
//! - The segment worker pool with first-failure cancellation
//! - Sandbox management for intermediate files
//! - The end-to-end pipeline run

pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod pipeline;
pub mod workspace;

pub use config::PipelineConfig;
pub use error::{PipelineError, WorkerResult};
pub use executor::{CancelToken, SegmentWorkerPool};
pub use logging::ItemLogger;
pub use pipeline::{Pipeline, RunOutcome};
