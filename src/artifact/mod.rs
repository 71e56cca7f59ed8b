//! Local JSON files slated for publication.

use crate::error::ArtifactReadError;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// One local JSON document, loaded and ready to publish.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub source_path: PathBuf,
    pub content: Value,
    /// `title` field of the content, else the file name.
    pub title: String,
    /// `id` field of the content, else the file stem.
    pub logical_id: String,
}

impl Artifact {
    pub async fn load(path: &Path) -> Result<Self, ArtifactReadError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(ArtifactReadError::Missing(path.to_path_buf()));
        }
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ArtifactReadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(path, &raw)
    }

    pub fn parse(path: &Path, raw: &str) -> Result<Self, ArtifactReadError> {
        let content: Value =
            serde_json::from_str(raw).map_err(|source| ArtifactReadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_value(path, content))
    }

    pub fn from_value(path: &Path, content: Value) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.clone());

        let title = string_field(&content, "title").unwrap_or(file_name);
        let logical_id = string_field(&content, "id").unwrap_or(stem);

        Self {
            source_path: path.to_path_buf(),
            content,
            title,
            logical_id,
        }
    }

    /// Text written into the editor: two-space pretty JSON, key order kept.
    pub fn serialized(&self) -> String {
        serde_json::to_string_pretty(&self.content).unwrap_or_else(|_| self.content.to_string())
    }

    pub fn display_path(&self) -> String {
        self.source_path.display().to_string()
    }
}

fn string_field(content: &Value, key: &str) -> Option<String> {
    content
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Splits a whitespace-separated file list (as CI tooling passes it).
pub fn parse_file_list(raw: &str) -> Vec<PathBuf> {
    raw.split_whitespace().map(PathBuf::from).collect()
}
