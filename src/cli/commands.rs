use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `binsync` - publish local JSON files to npoint.io and keep a registry bin current.
#[derive(Parser, Debug)]
#[command(name = "binsync")]
#[command(version)]
#[command(about = "Publish local JSON artifacts through the npoint.io editor.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.binsync/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Publish each file as a new bin, then upsert the registry
    Publish {
        /// JSON files to publish (default: whitespace-separated $CHANGED_FILES)
        files: Vec<PathBuf>,

        /// Show the browser window even in CI
        #[arg(long)]
        headed: bool,
    },

    /// Print the registry as currently served by the public endpoint
    Registry,
}
