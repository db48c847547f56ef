//! Application layer - Job stages driven through the ports.

pub mod executor;
pub mod fetcher;
pub mod metadata;
pub mod orchestrator;
pub mod publisher;

#[cfg(test)]
mod fixtures;
