#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use binsync::{Cli, Config};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // reqwest is built without a default provider; pick ring explicitly.
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Warning: Failed to install default crypto provider: {e:?}");
    }

    // Local runs keep credentials in .env; CI passes them as real env vars.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::load(cli.config.as_deref())?;
    binsync::app::dispatch(cli, config).await
}
