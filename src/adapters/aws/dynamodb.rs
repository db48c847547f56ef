use crate::domain::record::VideoRecord;
use crate::error::MetadataError;
use crate::ports::metadata::MetadataStore;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;
use tracing::info;

const ID_ATTR: &str = "id";
const URL_ATTR: &str = "url";

/// DynamoMetadataStore implements MetadataStore over a DynamoDB table keyed by `id`.
#[derive(Clone)]
pub struct DynamoMetadataStore {
    client: Client,
    table_name: String,
}

impl DynamoMetadataStore {
    pub fn new(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }
}

fn record_from_item(id: &str, item: &HashMap<String, AttributeValue>) -> VideoRecord {
    VideoRecord {
        id: item
            .get(ID_ATTR)
            .and_then(|v| v.as_s().ok())
            .cloned()
            .unwrap_or_else(|| id.to_string()),
        url: item.get(URL_ATTR).and_then(|v| v.as_s().ok()).cloned(),
    }
}

#[async_trait]
impl MetadataStore for DynamoMetadataStore {
    async fn connect(&self) -> Result<(), MetadataError> {
        let resp = self
            .client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
            .map_err(|e| MetadataError::Connect(Box::new(e)))?;

        let status = resp
            .table()
            .and_then(|t| t.table_status())
            .map(|s| s.as_str().to_string())
            .unwrap_or_default();
        info!(table = %self.table_name, %status, "connected to DynamoDB");
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Option<VideoRecord>, MetadataError> {
        let resp = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(ID_ATTR, AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| MetadataError::Query {
                id: id.to_string(),
                source: Box::new(e),
            })?;

        Ok(resp.item.as_ref().map(|item| record_from_item(id, item)))
    }

    async fn update_url(&self, id: &str, url: &str) -> Result<VideoRecord, MetadataError> {
        let resp = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(ID_ATTR, AttributeValue::S(id.to_string()))
            .update_expression("SET #url = :url")
            .condition_expression("attribute_exists(#id)")
            .expression_attribute_names("#url", URL_ATTR)
            .expression_attribute_names("#id", ID_ATTR)
            .expression_attribute_values(":url", AttributeValue::S(url.to_string()))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| MetadataError::Update {
                id: id.to_string(),
                source: Box::new(e),
            })?;

        Ok(resp
            .attributes
            .as_ref()
            .map(|attrs| record_from_item(id, attrs))
            .unwrap_or_else(|| VideoRecord {
                id: id.to_string(),
                url: Some(url.to_string()),
            }))
    }

    async fn close(&self) -> Result<(), MetadataError> {
        // HTTP-based client, nothing held open
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_item() {
        let mut item = HashMap::new();
        item.insert(ID_ATTR.to_string(), AttributeValue::S("abc123".to_string()));
        item.insert(
            URL_ATTR.to_string(),
            AttributeValue::S("https://cdn/master.m3u8".to_string()),
        );
        item.insert("title".to_string(), AttributeValue::S("ignored".to_string()));

        let record = record_from_item("abc123", &item);
        assert_eq!(record.id, "abc123");
        assert_eq!(record.url.as_deref(), Some("https://cdn/master.m3u8"));
    }

    #[test]
    fn test_record_without_url() {
        let mut item = HashMap::new();
        item.insert(ID_ATTR.to_string(), AttributeValue::S("abc123".to_string()));

        let record = record_from_item("abc123", &item);
        assert_eq!(record.url, None);
    }
}
