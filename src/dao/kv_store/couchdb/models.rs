use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One stored blob. The document id is the storage key itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    pub value: Value,
}

impl BlobDocument {
    pub fn new(id: &str, value: Value, rev: Option<String>) -> Self {
        Self {
            id: id.to_string(),
            rev,
            value,
        }
    }
}
