use crate::error::PublishError;
use std::fmt;
use tracing::debug;

/// Per-artifact publish states, in workflow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStage {
    Idle,
    Navigating,
    EditorReady,
    ContentCleared,
    ContentInserted,
    Saved,
    Captured,
    Failed,
}

impl PublishStage {
    /// Successor on the happy path; `None` for terminal states.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Navigating),
            Self::Navigating => Some(Self::EditorReady),
            Self::EditorReady => Some(Self::ContentCleared),
            Self::ContentCleared => Some(Self::ContentInserted),
            Self::ContentInserted => Some(Self::Saved),
            Self::Saved => Some(Self::Captured),
            Self::Captured | Self::Failed => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_terminal(self) -> bool {
        matches!(self, Self::Captured | Self::Failed)
    }
}

impl fmt::Display for PublishStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let activity = match self {
            Self::Idle => "idle",
            Self::Navigating => "creating a new bin",
            Self::EditorReady => "locating the editor",
            Self::ContentCleared => "clearing the editor",
            Self::ContentInserted => "inserting content",
            Self::Saved => "saving",
            Self::Captured => "capturing the bin id",
            Self::Failed => "failed",
        };
        f.write_str(activity)
    }
}

/// Walks one artifact through [`PublishStage`]s. Failures are reported
/// against the stage being entered.
#[derive(Debug)]
pub struct StageTracker {
    artifact: String,
    current: PublishStage,
    attempting: PublishStage,
}

impl StageTracker {
    pub fn new(artifact: impl Into<String>) -> Self {
        Self {
            artifact: artifact.into(),
            current: PublishStage::Idle,
            attempting: PublishStage::Idle,
        }
    }

    /// Start at a later state, e.g. when the page is already an edit page.
    pub fn starting_at(artifact: impl Into<String>, stage: PublishStage) -> Self {
        Self {
            artifact: artifact.into(),
            current: stage,
            attempting: stage,
        }
    }

    #[cfg(test)]
    pub(crate) fn current(&self) -> PublishStage {
        self.current
    }

    /// Begin work towards the next state.
    pub fn attempt(&mut self) -> PublishStage {
        if let Some(next) = self.current.next() {
            self.attempting = next;
        }
        self.attempting
    }

    /// The stage attempted last has been reached.
    pub fn reached(&mut self) {
        debug!(artifact = %self.artifact, stage = ?self.attempting, "publish.stage");
        self.current = self.attempting;
    }

    pub fn fail(&mut self, message: impl Into<String>) -> PublishError {
        let stage = self.attempting;
        self.current = PublishStage::Failed;
        PublishError {
            artifact: self.artifact.clone(),
            stage,
            message: message.into(),
        }
    }
}
