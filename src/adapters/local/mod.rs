//! Local adapters: filesystem object store and Redis metadata store.

pub mod fs;
pub mod redis;

pub use fs::FsStore;
pub use redis::RedisMetadataStore;
