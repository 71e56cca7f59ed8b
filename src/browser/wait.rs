use super::UiDriver;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlWait {
    Matched(String),
    /// Bound passed; carries the last URL observed (empty if none was read).
    TimedOut(String),
}

/// Poll the page location until `predicate` holds or `bound` passes.
pub async fn wait_for_url<F>(
    driver: &dyn UiDriver,
    bound: Duration,
    interval: Duration,
    predicate: F,
) -> UrlWait
where
    F: Fn(&str) -> bool,
{
    let deadline = Instant::now() + bound;
    let mut last = String::new();
    loop {
        match driver.current_url().await {
            Ok(url) => {
                if predicate(&url) {
                    return UrlWait::Matched(url);
                }
                last = url;
            }
            Err(e) => trace!(error = %e, "location read failed"),
        }
        let now = Instant::now();
        if now >= deadline {
            return UrlWait::TimedOut(last);
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}
