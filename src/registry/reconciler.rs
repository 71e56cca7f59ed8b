use super::fetch::RegistrySource;
use super::merge::merge_registry;
use crate::browser::SiteLocators;
use crate::config::{Config, SiteConfig, TimingConfig};
use crate::error::{ConfigError, RegistrySaveError};
use crate::publisher::{
    DEFAULT_PIPELINE, EditorWriter, InsertionStrategy, PublishStage, PublishedRecord, StageTracker,
};
use crate::session::Session;
use serde_json::Value;
use tracing::{info, warn};

/// What a reconciliation wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Entries in the document after the write.
    pub entries: usize,
    /// Prior entries dropped because this run republished their id.
    pub replaced: usize,
    /// False when the prior registry could not be read and was treated as empty.
    pub prior_read: bool,
}

pub struct RegistryReconciler {
    registry_id: String,
    site: SiteConfig,
    locators: SiteLocators,
    timing: TimingConfig,
    pipeline: Vec<InsertionStrategy>,
}

impl RegistryReconciler {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let registry_id = config.registry.require_bin_id()?.to_string();
        Ok(Self {
            registry_id,
            site: config.site.clone(),
            locators: config.locators.clone(),
            timing: config.timing.clone(),
            pipeline: DEFAULT_PIPELINE.to_vec(),
        })
    }

    /// Upsert `records` into the registry and write it back through the
    /// editor. Does nothing, not even a read, when `records` is empty.
    ///
    /// An unreadable registry is treated as empty, so the written document
    /// then holds only this run's records.
    pub async fn reconcile(
        &self,
        session: &Session,
        source: &dyn RegistrySource,
        records: &[PublishedRecord],
    ) -> Result<Option<ReconcileReport>, RegistrySaveError> {
        if records.is_empty() {
            return Ok(None);
        }

        let (current, prior_read) = match source.fetch().await {
            Ok(entries) => (entries, true),
            Err(e) => {
                warn!(
                    registry = %self.registry_id,
                    error = %e,
                    "registry unreadable; rewriting it from this run's records only"
                );
                (Vec::new(), false)
            }
        };
        let before = current.len();
        let untouched = count_untouched(&current, records);
        let merged = merge_registry(current, records)?;
        let entries = merged.len();
        let text = serde_json::to_string_pretty(&merged)?;

        let url = self.site.edit_url(&self.registry_id);
        let driver = session.driver();
        driver
            .goto(&url)
            .await
            .map_err(|e| RegistrySaveError::Navigation {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let mut tracker = StageTracker::starting_at("registry", PublishStage::Navigating);
        EditorWriter::new(driver, &self.locators, &self.timing, &self.pipeline)
            .write(&text, &mut tracker)
            .await
            .map_err(|e| RegistrySaveError::Editor {
                stage: e.stage,
                message: e.message,
            })?;

        let report = ReconcileReport {
            entries,
            replaced: before - untouched,
            prior_read,
        };
        info!(
            registry = %self.registry_id,
            entries = report.entries,
            replaced = report.replaced,
            "registry updated"
        );
        Ok(Some(report))
    }
}

fn count_untouched(current: &[Value], records: &[PublishedRecord]) -> usize {
    current
        .iter()
        .filter(|entry| {
            entry
                .get("id")
                .and_then(Value::as_str)
                .is_none_or(|id| !records.iter().any(|r| r.logical_id == id))
        })
        .count()
}
