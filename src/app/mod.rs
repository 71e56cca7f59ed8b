pub mod dispatch;
pub mod run;


pub use dispatch::dispatch;
pub use run::{RunSummary, Skipped, run_publish};
