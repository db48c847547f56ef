//! Ports - capability traits the pipeline depends on.

pub mod metadata;
pub mod storage;
pub mod transcoder;
