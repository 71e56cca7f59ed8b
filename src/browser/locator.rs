use super::UiDriver;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// One way of finding a UI element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "lowercase")]
pub enum Locator {
    /// CSS selector
    Css { selector: String },
    /// ARIA role plus a case-insensitive fragment of the accessible name
    Role { role: String, name: String },
    /// Element of `tag` whose visible text contains `text`
    Text { tag: String, text: String },
}

impl Locator {
    pub fn css(selector: &str) -> Self {
        Self::Css {
            selector: selector.into(),
        }
    }

    pub fn role(role: &str, name: &str) -> Self {
        Self::Role {
            role: role.into(),
            name: name.into(),
        }
    }

    pub fn text(tag: &str, text: &str) -> Self {
        Self::Text {
            tag: tag.into(),
            text: text.into(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css { selector } => write!(f, "css={selector}"),
            Self::Role { role, name } => write!(f, "role={role}[name~={name:?}]"),
            Self::Text { tag, text } => write!(f, "{tag}:has-text({text:?})"),
        }
    }
}

/// Outcome of resolving a [`LocatorChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Candidate at `index` (priority order) became visible.
    Found { index: usize, locator: Locator },
    NotFound,
}

impl Resolution {
    pub fn locator(self) -> Option<Locator> {
        match self {
            Self::Found { locator, .. } => Some(locator),
            Self::NotFound => None,
        }
    }
}

/// Prioritized candidates for one UI element, "first visible wins".
///
/// Every poll tick checks all candidates in order, so a lower-priority
/// candidate only wins while no higher-priority one is visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocatorChain {
    candidates: Vec<Locator>,
}

impl LocatorChain {
    pub fn new(candidates: Vec<Locator>) -> Self {
        Self { candidates }
    }

    pub fn candidates(&self) -> &[Locator] {
        &self.candidates
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// One pass over the candidates. Driver errors count as "not visible".
    pub async fn first_visible(&self, driver: &dyn UiDriver) -> Resolution {
        for (index, locator) in self.candidates.iter().enumerate() {
            match driver.is_visible(locator).await {
                Ok(true) => {
                    return Resolution::Found {
                        index,
                        locator: locator.clone(),
                    };
                }
                Ok(false) => {}
                Err(e) => debug!(locator = %locator, error = %e, "locator check failed"),
            }
        }
        Resolution::NotFound
    }

    /// Poll until a candidate is visible or `bound` passes. Always makes at
    /// least one pass.
    pub async fn resolve(
        &self,
        driver: &dyn UiDriver,
        bound: Duration,
        interval: Duration,
    ) -> Resolution {
        let deadline = Instant::now() + bound;
        loop {
            let resolution = self.first_visible(driver).await;
            if matches!(resolution, Resolution::Found { .. }) {
                return resolution;
            }
            let now = Instant::now();
            if now >= deadline {
                return Resolution::NotFound;
            }
            tokio::time::sleep(interval.min(deadline - now)).await;
        }
    }
}

impl From<Vec<Locator>> for LocatorChain {
    fn from(candidates: Vec<Locator>) -> Self {
        Self::new(candidates)
    }
}
