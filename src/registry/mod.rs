//! The registry bin: an id-keyed list of published records.

mod fetch;
mod merge;
mod reconciler;


pub use fetch::{HttpRegistrySource, RegistrySource, build_registry_client};
pub use merge::merge_registry;
pub use reconciler::{ReconcileReport, RegistryReconciler};
