use crate::browser::{Key, UiDriver};
use std::fmt;
use tracing::{debug, warn};

/// Ways of getting text into the focused editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionStrategy {
    /// Write the system clipboard out of band, then paste.
    ///
    /// Success means the clipboard write and the paste keystroke were both
    /// accepted. The editor is not read back, so a paste the page ignores
    /// without raising still counts as inserted and no later tier runs.
    Clipboard,
    /// Synthetic input events carrying the text.
    DirectInput,
}

/// Preferred order: clipboard is fast, direct input works without
/// clipboard access.
pub const DEFAULT_PIPELINE: &[InsertionStrategy] =
    &[InsertionStrategy::Clipboard, InsertionStrategy::DirectInput];

impl InsertionStrategy {
    pub async fn apply(self, driver: &dyn UiDriver, text: &str) -> anyhow::Result<()> {
        match self {
            Self::Clipboard => {
                driver.write_clipboard(text).await?;
                driver.press(Key::Paste).await
            }
            Self::DirectInput => driver.insert_text(text).await,
        }
    }
}

impl fmt::Display for InsertionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Clipboard => "clipboard",
            Self::DirectInput => "direct-input",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(InsertionStrategy),
    /// Every strategy failed; one message per attempt, in order.
    Exhausted(Vec<(InsertionStrategy, String)>),
}

/// Try each strategy in order until one succeeds. A failed attempt may
/// leave partial text behind, so the editor is emptied again before the
/// next strategy runs.
pub async fn insert_with_fallback(
    driver: &dyn UiDriver,
    pipeline: &[InsertionStrategy],
    text: &str,
) -> InsertOutcome {
    let mut failures = Vec::new();
    for (i, strategy) in pipeline.iter().copied().enumerate() {
        if i > 0
            && let Err(e) = reset(driver).await
        {
            debug!(error = %e, "editor reset before fallback failed");
        }
        match strategy.apply(driver, text).await {
            Ok(()) => {
                debug!(strategy = %strategy, "content inserted");
                return InsertOutcome::Inserted(strategy);
            }
            Err(e) => {
                warn!(strategy = %strategy, error = %e, "insertion strategy failed");
                failures.push((strategy, e.to_string()));
            }
        }
    }
    InsertOutcome::Exhausted(failures)
}

async fn reset(driver: &dyn UiDriver) -> anyhow::Result<()> {
    driver.press(Key::SelectAll).await?;
    driver.press(Key::Backspace).await
}
