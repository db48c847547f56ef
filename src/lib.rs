//! Encore - single-job HLS transcoding pipeline.
//!
//! Hexagonal Architecture:
//! - domain/: Pure job logic (locations, rendition ladder, encoding plan, playlists)
//! - ports/: Trait definitions (object store, metadata store, transcoder)
//! - adapters/: Concrete implementations
//! - application/: Job stages and the orchestrator that sequences them
//! - config: Environment configuration
//!
//! # Features
//! - `aws`: S3 object store and DynamoDB metadata store (`aws_job` binary)
//! - `local`: Filesystem object store and Redis metadata store (`local_job` binary)

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

// Re-exports for convenience
pub use application::orchestrator::{JobOutcome, JobState, Pipeline};
pub use config::JobConfig;
pub use error::PipelineError;
