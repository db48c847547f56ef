use serde::{Deserialize, Serialize};

/// The slice of a video metadata record the pipeline reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    pub url: Option<String>,
}
