use crate::publisher::PublishStage;
use std::path::PathBuf;
use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `binsync`.
///
/// Only authentication, configuration and registry-write failures ever reach
/// the top of a run. Artifact and publish failures are absorbed per artifact,
/// and registry read failures are absorbed into an empty registry.
#[derive(Debug, Error)]
pub enum BinsyncError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Login ────────────────────────────────────────────────────────────
    #[error("authentication: {0}")]
    Authentication(#[from] AuthenticationError),

    // ── Registry write-back ──────────────────────────────────────────────
    #[error("registry: {0}")]
    RegistrySave(#[from] RegistrySaveError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid setting {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Login errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("could not open {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("login form element not found: {0}")]
    FormNotFound(&'static str),

    #[error("login interaction failed: {0}")]
    Interaction(String),

    #[error("did not reach the authenticated area within {timeout_ms}ms (last url: {last_url})")]
    Timeout { timeout_ms: u64, last_url: String },
}

// ─── Artifact errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ArtifactReadError {
    #[error("file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// ─── Publish errors ──────────────────────────────────────────────────────────

/// A UI step failed while publishing one artifact. Recoverable: the caller
/// skips the artifact and moves on.
#[derive(Debug, Error)]
#[error("publishing {artifact} failed while {stage}: {message}")]
pub struct PublishError {
    pub artifact: String,
    pub stage: PublishStage,
    pub message: String,
}

// ─── Registry errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RegistryFetchError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("body is not JSON: {0}")]
    Decode(String),

    #[error("registry is not a list (found {0})")]
    NotAList(&'static str),
}

#[derive(Debug, Error)]
pub enum RegistrySaveError {
    #[error("could not open registry editor {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("failed to serialize registry: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("editor write failed while {stage}: {message}")]
    Editor { stage: PublishStage, message: String },
}

pub type Result<T, E = BinsyncError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_error_names_stage_and_artifact() {
        let err = PublishError {
            artifact: "lessons/plants.json".into(),
            stage: PublishStage::EditorReady,
            message: "no editor candidate became visible".into(),
        };
        let text = err.to_string();
        assert!(text.contains("lessons/plants.json"));
        assert!(text.contains("locating the editor"));
    }

    #[test]
    fn authentication_error_converts_to_top_level() {
        let err: BinsyncError = AuthenticationError::Timeout {
            timeout_ms: 30_000,
            last_url: "https://www.npoint.io/".into(),
        }
        .into();
        assert!(matches!(err, BinsyncError::Authentication(_)));
        assert!(err.to_string().starts_with("authentication:"));
    }

    #[test]
    fn missing_artifact_shows_path() {
        let err = ArtifactReadError::Missing(PathBuf::from("gone.json"));
        assert_eq!(err.to_string(), "file not found: gone.json");
    }
}
