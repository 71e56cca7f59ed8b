use serde::{Deserialize, Serialize};

/// Result of publishing one artifact. Serializes to the registry's
/// `{"id", "title", "url"}` entry shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedRecord {
    #[serde(rename = "id")]
    pub logical_id: String,
    pub title: String,
    #[serde(rename = "url")]
    pub public_url: String,
}
