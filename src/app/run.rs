use crate::artifact::Artifact;
use crate::browser::UiDriver;
use crate::config::Config;
use crate::error::BinsyncError;
use crate::publisher::{BinPublisher, PublishedRecord};
use crate::registry::{ReconcileReport, RegistryReconciler, RegistrySource};
use crate::session::{Session, SessionManager};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// An input that produced no record, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of one `publish` run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub published: Vec<PublishedRecord>,
    pub skipped: Vec<Skipped>,
    /// `None` when nothing was published and the registry was left alone.
    pub registry: Option<ReconcileReport>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "published {} artifact(s), skipped {}",
            self.published.len(),
            self.skipped.len()
        )?;
        for record in &self.published {
            writeln!(f, "  + {} -> {}", record.logical_id, record.public_url)?;
        }
        for skipped in &self.skipped {
            writeln!(f, "  - {}: {}", skipped.path.display(), skipped.reason)?;
        }
        match &self.registry {
            Some(report) if report.prior_read => write!(
                f,
                "registry updated ({} entries, {} replaced)",
                report.entries, report.replaced
            ),
            Some(report) => write!(
                f,
                "registry rewritten from this run only ({} entries; prior content was unreadable)",
                report.entries
            ),
            None => write!(f, "registry not updated"),
        }
    }
}

/// Publish every file in `paths` through `driver`, then reconcile the
/// registry if anything was published.
///
/// The session is closed on every path out of this function once login
/// succeeded. A failed login closes the driver itself.
pub async fn run_publish(
    config: &Config,
    driver: Box<dyn UiDriver>,
    source: &dyn RegistrySource,
    paths: &[PathBuf],
) -> Result<RunSummary, BinsyncError> {
    let manager = SessionManager::new(config)?;
    let reconciler = RegistryReconciler::new(config)?;
    let publisher = BinPublisher::new(config);

    let mut summary = RunSummary::default();
    let artifacts = load_all(paths, &mut summary.skipped).await;
    if artifacts.is_empty() {
        info!("no readable artifacts; nothing to publish");
        if let Err(e) = driver.close().await {
            warn!(error = %e, "browser did not close cleanly");
        }
        return Ok(summary);
    }

    let session = manager.authenticate(driver).await?;
    info!(
        entry = ?session.entry(),
        artifacts = artifacts.len(),
        "session ready"
    );
    let outcome = publish_and_reconcile(
        &session,
        &publisher,
        &reconciler,
        source,
        &artifacts,
        &mut summary,
    )
    .await;
    session.close().await;

    outcome.map(|()| summary)
}

async fn publish_and_reconcile(
    session: &Session,
    publisher: &BinPublisher,
    reconciler: &RegistryReconciler,
    source: &dyn RegistrySource,
    artifacts: &[Artifact],
    summary: &mut RunSummary,
) -> Result<(), BinsyncError> {
    for artifact in artifacts {
        match publisher.publish(session, artifact).await {
            Ok(record) => {
                info!(
                    artifact = %artifact.display_path(),
                    id = %record.logical_id,
                    url = %record.public_url,
                    "publish.ok"
                );
                summary.published.push(record);
            }
            Err(e) => {
                warn!(
                    artifact = %artifact.display_path(),
                    stage = ?e.stage,
                    error = %e.message,
                    "publish.skipped"
                );
                summary.skipped.push(Skipped {
                    path: artifact.source_path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    summary.registry = reconciler
        .reconcile(session, source, &summary.published)
        .await?;
    Ok(())
}

async fn load_all(paths: &[PathBuf], skipped: &mut Vec<Skipped>) -> Vec<Artifact> {
    let mut artifacts = Vec::with_capacity(paths.len());
    for path in paths {
        match Artifact::load(path).await {
            Ok(artifact) => artifacts.push(artifact),
            Err(e) => {
                warn!(artifact = %path.display(), error = %e, "publish.skipped");
                skipped.push(skip(path, e.to_string()));
            }
        }
    }
    artifacts
}

fn skip(path: &Path, reason: String) -> Skipped {
    Skipped {
        path: path.to_path_buf(),
        reason,
    }
}
