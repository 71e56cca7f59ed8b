//! Publishing one artifact as a fresh bin through the site's editor.

mod editor;
mod insert;
mod record;
mod stage;


pub use editor::EditorWriter;
pub use insert::{DEFAULT_PIPELINE, InsertOutcome, InsertionStrategy, insert_with_fallback};
pub use record::PublishedRecord;
pub use stage::{PublishStage, StageTracker};

use crate::artifact::Artifact;
use crate::browser::{
    LocatorChain, Resolution, SiteLocators, UiDriver, UrlWait, bin_id_from_url, is_bin_url,
    wait_for_url,
};
use crate::config::{Config, SiteConfig, TimingConfig};
use crate::error::PublishError;
use crate::session::Session;
use std::time::Duration;
use tracing::{debug, info};

/// Where to look for the "create new bin" control, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CreateRoute {
    /// Whatever page is currently open.
    InPage,
    /// Navigate to the dashboard first.
    Dashboard,
}

const CREATE_ROUTES: &[CreateRoute] = &[CreateRoute::InPage, CreateRoute::Dashboard];

pub struct BinPublisher {
    site: SiteConfig,
    locators: SiteLocators,
    timing: TimingConfig,
    pipeline: Vec<InsertionStrategy>,
}

impl BinPublisher {
    pub fn new(config: &Config) -> Self {
        Self {
            site: config.site.clone(),
            locators: config.locators.clone(),
            timing: config.timing.clone(),
            pipeline: DEFAULT_PIPELINE.to_vec(),
        }
    }

    #[must_use]
    pub fn with_pipeline(mut self, pipeline: Vec<InsertionStrategy>) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Publish `artifact` as a new bin. A record is only returned once every
    /// stage through `Captured` has completed.
    pub async fn publish(
        &self,
        session: &Session,
        artifact: &Artifact,
    ) -> Result<PublishedRecord, PublishError> {
        let driver = session.driver();
        let mut tracker = StageTracker::new(artifact.display_path());

        tracker.attempt();
        let draft_url = self.create_bin(driver).await.map_err(|m| tracker.fail(m))?;
        tracker.reached();
        info!(artifact = %artifact.display_path(), url = %draft_url, "draft bin created");

        let text = artifact.serialized();
        let strategy = EditorWriter::new(driver, &self.locators, &self.timing, &self.pipeline)
            .write(&text, &mut tracker)
            .await?;
        debug!(artifact = %artifact.display_path(), strategy = %strategy, "content saved");

        tracker.attempt();
        let location = driver
            .current_url()
            .await
            .map_err(|e| tracker.fail(format!("could not read location: {e}")))?;
        let bin_id = bin_id_from_url(&location, &self.site.doc_root)
            .ok_or_else(|| tracker.fail(format!("{location} is not a bin edit page")))?;
        tracker.reached();

        Ok(PublishedRecord {
            logical_id: artifact.logical_id.clone(),
            title: artifact.title.clone(),
            public_url: self.site.public_url(&bin_id),
        })
    }

    /// Trigger creation and wait for the server-assigned bin URL.
    async fn create_bin(&self, driver: &dyn UiDriver) -> Result<String, String> {
        let mut attempts = Vec::new();
        for route in CREATE_ROUTES {
            let bound = match route {
                CreateRoute::InPage => self.timing.create_control(),
                CreateRoute::Dashboard => {
                    let dashboard = self.site.dashboard_url();
                    if let Err(e) = driver.goto(&dashboard).await {
                        attempts.push(format!("{route:?}: {e}"));
                        continue;
                    }
                    self.timing.dashboard_control()
                }
            };

            let before = driver.current_url().await.unwrap_or_default();
            match self.click_first(driver, &self.locators.new_bin, bound).await {
                Ok(()) => {
                    debug!(route = ?route, "create control clicked");
                    return self.wait_for_new_bin_url(driver, &before).await;
                }
                Err(e) => {
                    debug!(route = ?route, error = %e, "create control unavailable");
                    attempts.push(format!("{route:?}: {e}"));
                }
            }
        }
        Err(format!(
            "no create control found ({})",
            attempts.join("; ")
        ))
    }

    async fn click_first(
        &self,
        driver: &dyn UiDriver,
        chain: &LocatorChain,
        bound: Duration,
    ) -> Result<(), String> {
        match chain
            .resolve(driver, bound, self.timing.poll_interval())
            .await
        {
            Resolution::Found { locator, .. } => {
                driver.click(&locator).await.map_err(|e| e.to_string())
            }
            Resolution::NotFound => Err(format!("not visible within {}ms", bound.as_millis())),
        }
    }

    /// The identifier is server-assigned, so any bin URL other than the one
    /// open before the click counts.
    async fn wait_for_new_bin_url(
        &self,
        driver: &dyn UiDriver,
        before: &str,
    ) -> Result<String, String> {
        let doc_root = self.site.doc_root.as_str();
        match wait_for_url(
            driver,
            self.timing.bin_url(),
            self.timing.poll_interval(),
            |url| url != before && is_bin_url(url, doc_root),
        )
        .await
        {
            UrlWait::Matched(url) => Ok(url),
            UrlWait::TimedOut(last) => Err(format!(
                "no bin identifier assigned within {}ms (last url: {last})",
                self.timing.bin_url_ms
            )),
        }
    }
}
