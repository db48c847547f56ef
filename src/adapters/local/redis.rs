//! Redis-backed MetadataStore for local deployment.
//!
//! Each record is a hash at `<namespace>:video:<id>`; the pipeline only
//! touches its `url` field.

use crate::domain::record::VideoRecord;
use crate::error::{BoxError, MetadataError};
use crate::ports::metadata::MetadataStore;
use async_trait::async_trait;
use deadpool_redis::redis::{self, AsyncCommands};
use deadpool_redis::{Config, Connection, Pool, Runtime};
use std::collections::HashMap;
use tracing::info;

const URL_FIELD: &str = "url";

#[derive(Clone)]
pub struct RedisMetadataStore {
    pool: Pool,
    namespace: String,
}

impl RedisMetadataStore {
    /// Build the connection pool. Connections are opened lazily; `connect` verifies one.
    pub fn new(redis_url: &str, namespace: &str) -> Result<Self, MetadataError> {
        let pool = Config::from_url(redis_url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| MetadataError::Connect(Box::new(e)))?;
        Ok(Self {
            pool,
            namespace: namespace.to_string(),
        })
    }

    fn key(&self, id: &str) -> String {
        format!("{}:video:{}", self.namespace, id)
    }

    async fn conn(&self) -> Result<Connection, deadpool_redis::PoolError> {
        self.pool.get().await
    }
}

#[async_trait]
impl MetadataStore for RedisMetadataStore {
    async fn connect(&self) -> Result<(), MetadataError> {
        let mut conn = self
            .conn()
            .await
            .map_err(|e| MetadataError::Connect(Box::new(e)))?;
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| MetadataError::Connect(Box::new(e)))?;
        info!(namespace = %self.namespace, reply = %pong, "connected to Redis");
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Option<VideoRecord>, MetadataError> {
        let query_err = |source: BoxError| MetadataError::Query {
            id: id.to_string(),
            source,
        };
        let mut conn = self.conn().await.map_err(|e| query_err(e.into()))?;
        let fields: HashMap<String, String> = conn
            .hgetall(self.key(id))
            .await
            .map_err(|e| query_err(e.into()))?;

        if fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(VideoRecord {
            id: id.to_string(),
            url: fields.get(URL_FIELD).cloned(),
        }))
    }

    async fn update_url(&self, id: &str, url: &str) -> Result<VideoRecord, MetadataError> {
        let update_err = |source: BoxError| MetadataError::Update {
            id: id.to_string(),
            source,
        };
        let mut conn = self.conn().await.map_err(|e| update_err(e.into()))?;
        conn.hset::<_, _, _, ()>(self.key(id), URL_FIELD, url)
            .await
            .map_err(|e| update_err(e.into()))?;

        Ok(VideoRecord {
            id: id.to_string(),
            url: Some(url.to_string()),
        })
    }

    async fn close(&self) -> Result<(), MetadataError> {
        self.pool.close();
        Ok(())
    }
}
