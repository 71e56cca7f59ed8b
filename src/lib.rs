#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use
)]

pub mod app;
pub mod artifact;
pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod publisher;
pub mod registry;
pub mod session;

pub use artifact::Artifact;
pub use cli::{Cli, Commands};
pub use config::Config;
pub use error::{BinsyncError, Result};
pub use publisher::{BinPublisher, PublishedRecord};
pub use registry::RegistryReconciler;
pub use session::{Session, SessionManager};
