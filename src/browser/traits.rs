use super::Locator;
use anyhow::Result;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub type UiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Keyboard shortcuts the flows issue against the focused element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    SelectAll,
    Backspace,
    Paste,
}

/// The remote UI surface, one page of one browser context.
///
/// The production implementation drives Chrome over the DevTools protocol;
/// tests use a simulated site. Every call is a single bounded interaction;
/// polling and fallback ordering live above this trait.
pub trait UiDriver: Send + Sync {
    /// Human-readable backend name (e.g. "chromium")
    fn name(&self) -> &str;

    /// Pre-grant clipboard read/write for `origin`.
    fn grant_clipboard<'a>(&'a self, origin: &'a str) -> UiFuture<'a, ()>;

    fn goto<'a>(&'a self, url: &'a str) -> UiFuture<'a, ()>;

    /// Wait for the page's network activity to go quiet. Errors when `bound`
    /// passes first; callers treat that as non-fatal.
    fn settle_network(&self, bound: Duration) -> UiFuture<'_, ()>;

    fn current_url(&self) -> UiFuture<'_, String>;

    /// Single check, no waiting.
    fn is_visible<'a>(&'a self, locator: &'a Locator) -> UiFuture<'a, bool>;

    fn click<'a>(&'a self, locator: &'a Locator) -> UiFuture<'a, ()>;

    /// Replace the value of an input with `value`.
    fn fill<'a>(&'a self, locator: &'a Locator, value: &'a str) -> UiFuture<'a, ()>;

    fn press(&self, key: Key) -> UiFuture<'_, ()>;

    /// Put `text` on the system clipboard without touching the page.
    fn write_clipboard<'a>(&'a self, text: &'a str) -> UiFuture<'a, ()>;

    /// Insert `text` at the focused element as synthetic input.
    fn insert_text<'a>(&'a self, text: &'a str) -> UiFuture<'a, ()>;

    /// Tear down the browser context.
    fn close(&self) -> UiFuture<'_, ()>;
}
