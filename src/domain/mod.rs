//! Domain layer - Pure business logic.

pub mod content_type;
pub mod hls;
pub mod job;
pub mod location;
pub mod plan;
pub mod record;
pub mod rendition;
