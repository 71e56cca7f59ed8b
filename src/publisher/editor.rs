use super::insert::{InsertOutcome, InsertionStrategy, insert_with_fallback};
use super::stage::StageTracker;
use crate::browser::{Key, Resolution, SiteLocators, UiDriver};
use crate::config::TimingConfig;
use crate::error::PublishError;
use tracing::debug;

/// Locate / clear / insert / save against whatever edit page is open.
/// Shared by bin publishing and the registry write-back.
pub struct EditorWriter<'a> {
    driver: &'a dyn UiDriver,
    locators: &'a SiteLocators,
    timing: &'a TimingConfig,
    pipeline: &'a [InsertionStrategy],
}

impl<'a> EditorWriter<'a> {
    pub fn new(
        driver: &'a dyn UiDriver,
        locators: &'a SiteLocators,
        timing: &'a TimingConfig,
        pipeline: &'a [InsertionStrategy],
    ) -> Self {
        Self {
            driver,
            locators,
            timing,
            pipeline,
        }
    }

    /// Drives `tracker` through `EditorReady..=Saved`. Returns the strategy
    /// that got the text in.
    pub async fn write(
        &self,
        text: &str,
        tracker: &mut StageTracker,
    ) -> Result<InsertionStrategy, PublishError> {
        tracker.attempt();
        let editor = match self
            .locators
            .editor
            .resolve(self.driver, self.timing.editor(), self.timing.poll_interval())
            .await
        {
            Resolution::Found { index, locator } => {
                debug!(candidate = index, locator = %locator, "editor located");
                locator
            }
            Resolution::NotFound => {
                return Err(tracker.fail(format!(
                    "no editor candidate became visible within {}ms",
                    self.timing.editor_ms
                )));
            }
        };
        tracker.reached();

        tracker.attempt();
        self.driver
            .click(&editor)
            .await
            .map_err(|e| tracker.fail(format!("could not focus editor: {e}")))?;
        self.driver
            .press(Key::SelectAll)
            .await
            .map_err(|e| tracker.fail(format!("select-all failed: {e}")))?;
        self.driver
            .press(Key::Backspace)
            .await
            .map_err(|e| tracker.fail(format!("delete failed: {e}")))?;
        tracker.reached();

        tracker.attempt();
        let strategy = match insert_with_fallback(self.driver, self.pipeline, text).await {
            InsertOutcome::Inserted(strategy) => strategy,
            InsertOutcome::Exhausted(failures) => {
                let detail = failures
                    .iter()
                    .map(|(s, e)| format!("{s}: {e}"))
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(tracker.fail(format!("every insertion strategy failed ({detail})")));
            }
        };
        tracker.reached();

        tracker.attempt();
        let save = self
            .locators
            .save
            .resolve(
                self.driver,
                self.timing.create_control(),
                self.timing.poll_interval(),
            )
            .await
            .locator()
            .ok_or_else(|| tracker.fail("save control not found"))?;
        self.driver
            .click(&save)
            .await
            .map_err(|e| tracker.fail(format!("save click failed: {e}")))?;
        // Persistence is asynchronous server-side; give it time to land.
        tokio::time::sleep(self.timing.save_settle()).await;
        tracker.reached();

        Ok(strategy)
    }
}
