use crate::artifact::parse_file_list;
use crate::browser::ChromiumDriver;
use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::registry::{HttpRegistrySource, RegistrySource};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use super::run::run_publish;

/// Explicit arguments win; otherwise the CI-provided `CHANGED_FILES` list.
pub fn resolve_files(args: Vec<PathBuf>, changed_files: Option<&str>) -> Vec<PathBuf> {
    if !args.is_empty() {
        return args;
    }
    changed_files.map(parse_file_list).unwrap_or_default()
}

pub async fn dispatch(cli: Cli, mut config: Config) -> Result<()> {
    match cli.command {
        Commands::Publish { files, headed } => {
            let changed = std::env::var("CHANGED_FILES").ok();
            let files = resolve_files(files, changed.as_deref());
            if files.is_empty() {
                info!("no files to process");
                return Ok(());
            }

            config.validate_for_publish()?;
            if headed {
                config.browser.headless = false;
            }

            let source =
                HttpRegistrySource::new(&config.site, config.registry.require_bin_id()?);

            info!(
                files = files.len(),
                headless = config.browser.headless,
                "launching browser"
            );
            let driver = ChromiumDriver::launch(&config.browser, config.timing.navigation())
                .await
                .context("failed to launch browser")?;

            let summary = run_publish(&config, Box::new(driver), &source, &files).await?;
            println!("{summary}");
            Ok(())
        }

        Commands::Registry => {
            let source =
                HttpRegistrySource::new(&config.site, config.registry.require_bin_id()?);
            let entries = source
                .fetch()
                .await
                .with_context(|| format!("failed to read registry from {}", source.url()))?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
            Ok(())
        }
    }
}
