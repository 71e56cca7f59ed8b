use super::{Key, Locator, UiDriver, UiFuture};
use crate::config::BrowserConfig;
use anyhow::{Context, Result, anyhow, bail};
use chromiumoxide::cdp::browser_protocol::browser::{GrantPermissionsParams, PermissionType};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, InsertTextParams,
};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::{Browser, Page};
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

const TARGET_ATTR: &str = "data-binsync-target";

/// Chrome/Chromium over the DevTools protocol, one page per run.
pub struct ChromiumDriver {
    browser: Mutex<Browser>,
    page: Page,
    handler: JoinHandle<()>,
    navigation_timeout: Duration,
    marks: AtomicU64,
}

impl ChromiumDriver {
    pub async fn launch(config: &BrowserConfig, navigation_timeout: Duration) -> Result<Self> {
        let mut builder = chromiumoxide::BrowserConfig::builder();
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(ref exe) = config.executable {
            builder = builder.chrome_executable(exe);
        }
        for arg in &config.args {
            builder = builder.arg(arg.as_str());
        }
        let browser_config = builder
            .build()
            .map_err(|e| anyhow!("invalid browser configuration: {e}"))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .context("failed to launch browser")?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "browser event loop stopped");
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to open browser page")?;
        page.execute(SetUserAgentOverrideParams::new(config.user_agent.clone()))
            .await
            .context("failed to set user agent")?;

        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler,
            navigation_timeout,
            marks: AtomicU64::new(0),
        })
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> Result<T> {
        let params = EvaluateParams::builder()
            .expression(script)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(|e| anyhow!("invalid evaluate params: {e}"))?;
        let result = self.page.evaluate_expression(params).await?;
        result
            .into_value::<T>()
            .context("script returned an unexpected value")
    }

    /// Tag the first visible match of `locator` and return a CSS selector for it.
    async fn mark(&self, locator: &Locator) -> Result<String> {
        let token = self.marks.fetch_add(1, Ordering::Relaxed).to_string();
        let found: bool = self.eval(locate_script(locator, Some(&token))).await?;
        if !found {
            bail!("no visible element for {locator}");
        }
        Ok(format!("[{TARGET_ATTR}=\"{token}\"]"))
    }

    async fn dispatch_key(&self, key: Key) -> Result<()> {
        let spec = KeySpec::for_key(key);
        let mut down = spec.event(DispatchKeyEventType::RawKeyDown);
        if !spec.commands.is_empty() {
            down.commands = Some(spec.commands.iter().map(|c| (*c).to_string()).collect());
        }
        self.page.execute(down).await?;
        self.page
            .execute(spec.event(DispatchKeyEventType::KeyUp))
            .await?;
        Ok(())
    }
}

impl UiDriver for ChromiumDriver {
    fn name(&self) -> &str {
        "chromium"
    }

    fn grant_clipboard<'a>(&'a self, origin: &'a str) -> UiFuture<'a, ()> {
        Box::pin(async move {
            let mut params = GrantPermissionsParams::new(vec![
                PermissionType::ClipboardReadWrite,
                PermissionType::ClipboardSanitizedWrite,
            ]);
            params.origin = Some(origin.to_string());
            self.browser
                .lock()
                .await
                .execute(params)
                .await
                .context("clipboard permission grant rejected")?;
            Ok(())
        })
    }

    fn goto<'a>(&'a self, url: &'a str) -> UiFuture<'a, ()> {
        Box::pin(async move {
            tokio::time::timeout(self.navigation_timeout, self.page.goto(url))
                .await
                .map_err(|_| anyhow!("navigation to {url} timed out"))?
                .with_context(|| format!("navigation to {url} failed"))?;
            Ok(())
        })
    }

    fn settle_network(&self, bound: Duration) -> UiFuture<'_, ()> {
        Box::pin(async move {
            let deadline = Instant::now() + bound;
            let quiet_for = Duration::from_millis(500);
            let mut last_count = None;
            let mut quiet_since = Instant::now();
            while Instant::now() < deadline {
                let (ready, count): (bool, u64) = self
                    .eval(
                        "[document.readyState === 'complete', \
                         performance.getEntriesByType('resource').length]"
                            .to_string(),
                    )
                    .await?;
                if last_count != Some(count) {
                    last_count = Some(count);
                    quiet_since = Instant::now();
                } else if ready && quiet_since.elapsed() >= quiet_for {
                    return Ok(());
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            bail!("network still busy after {}ms", bound.as_millis())
        })
    }

    fn current_url(&self) -> UiFuture<'_, String> {
        Box::pin(async move { Ok(self.page.url().await?.unwrap_or_default()) })
    }

    fn is_visible<'a>(&'a self, locator: &'a Locator) -> UiFuture<'a, bool> {
        Box::pin(async move { self.eval(locate_script(locator, None)).await })
    }

    fn click<'a>(&'a self, locator: &'a Locator) -> UiFuture<'a, ()> {
        Box::pin(async move {
            let selector = self.mark(locator).await?;
            self.page.find_element(selector).await?.click().await?;
            Ok(())
        })
    }

    fn fill<'a>(&'a self, locator: &'a Locator, value: &'a str) -> UiFuture<'a, ()> {
        Box::pin(async move {
            let selector = self.mark(locator).await?;
            self.page.find_element(selector).await?.click().await?;
            self.dispatch_key(Key::SelectAll).await?;
            self.dispatch_key(Key::Backspace).await?;
            self.page.execute(InsertTextParams::new(value)).await?;
            Ok(())
        })
    }

    fn press(&self, key: Key) -> UiFuture<'_, ()> {
        Box::pin(async move { self.dispatch_key(key).await })
    }

    fn write_clipboard<'a>(&'a self, text: &'a str) -> UiFuture<'a, ()> {
        Box::pin(async move {
            let literal = serde_json::to_string(text)?;
            let _: bool = self
                .eval(format!(
                    "navigator.clipboard.writeText({literal}).then(() => true)"
                ))
                .await
                .context("clipboard write rejected")?;
            Ok(())
        })
    }

    fn insert_text<'a>(&'a self, text: &'a str) -> UiFuture<'a, ()> {
        Box::pin(async move {
            self.page.execute(InsertTextParams::new(text)).await?;
            Ok(())
        })
    }

    fn close(&self) -> UiFuture<'_, ()> {
        Box::pin(async move {
            let mut browser = self.browser.lock().await;
            let closed = browser.close().await;
            let _ = browser.wait().await;
            self.handler.abort();
            closed.context("browser did not close cleanly")?;
            Ok(())
        })
    }
}

struct KeySpec {
    key: &'static str,
    code: &'static str,
    key_code: i64,
    modifiers: i64,
    commands: &'static [&'static str],
}

// CDP modifier bit for Control.
const CTRL: i64 = 2;

impl KeySpec {
    fn for_key(key: Key) -> Self {
        match key {
            Key::SelectAll => Self {
                key: "a",
                code: "KeyA",
                key_code: 65,
                modifiers: CTRL,
                commands: &["selectAll"],
            },
            Key::Backspace => Self {
                key: "Backspace",
                code: "Backspace",
                key_code: 8,
                modifiers: 0,
                commands: &[],
            },
            Key::Paste => Self {
                key: "v",
                code: "KeyV",
                key_code: 86,
                modifiers: CTRL,
                commands: &["paste"],
            },
        }
    }

    fn event(&self, kind: DispatchKeyEventType) -> DispatchKeyEventParams {
        let mut params = DispatchKeyEventParams::new(kind);
        params.key = Some(self.key.to_string());
        params.code = Some(self.code.to_string());
        params.windows_virtual_key_code = Some(self.key_code);
        params.native_virtual_key_code = Some(self.key_code);
        params.modifiers = Some(self.modifiers);
        params
    }
}

fn role_selector(role: &str) -> String {
    match role {
        "button" => {
            "button, [role=\"button\"], input[type=\"submit\"], input[type=\"button\"]".into()
        }
        "textbox" => "input:not([type]), input[type=\"text\"], input[type=\"email\"], \
                      input[type=\"search\"], textarea, [role=\"textbox\"]"
            .into(),
        "link" => "a[href], [role=\"link\"]".into(),
        other => format!("[role=\"{other}\"]"),
    }
}

fn js_string(raw: &str) -> String {
    serde_json::to_string(raw).unwrap_or_else(|_| "\"\"".into())
}

/// Script resolving `locator` to its first visible element. Returns a
/// boolean; with `mark`, the element is also tagged for a follow-up query.
pub(crate) fn locate_script(locator: &Locator, mark: Option<&str>) -> String {
    let (selector, filter) = match locator {
        Locator::Css { selector } => (selector.clone(), "() => true".to_string()),
        Locator::Role { role, name } => (
            role_selector(role),
            format!(
                "(el) => {{ const n = {}; return !n || accessibleName(el).includes(n); }}",
                js_string(&name.to_lowercase())
            ),
        ),
        Locator::Text { tag, text } => (
            tag.clone(),
            format!(
                "(el) => norm(el.textContent).includes({})",
                js_string(&text.to_lowercase())
            ),
        ),
    };

    let tag = match mark {
        Some(token) => format!(
            "document.querySelectorAll('[{TARGET_ATTR}]')\
             .forEach((e) => e.removeAttribute('{TARGET_ATTR}'));\
             el.setAttribute('{TARGET_ATTR}', {});",
            js_string(token)
        ),
        None => String::new(),
    };

    format!(
        "(() => {{\
         const norm = (s) => (s || '').replace(/\\s+/g, ' ').trim().toLowerCase();\
         const accessibleName = (el) => [\
           el.getAttribute('aria-label'),\
           el.labels && el.labels[0] ? el.labels[0].textContent : '',\
           el.getAttribute('placeholder'),\
           el.getAttribute('name'),\
           el.getAttribute('type'),\
           el.textContent,\
           el.value\
         ].map(norm).join(' ');\
         const visible = (el) => {{\
           const r = el.getBoundingClientRect();\
           const s = getComputedStyle(el);\
           return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none';\
         }};\
         const matches = {filter};\
         const el = Array.from(document.querySelectorAll({selector}))\
           .find((el) => matches(el) && visible(el));\
         if (!el) {{ return false; }}\
         {tag}\
         return true;\
         }})()",
        selector = js_string(&selector),
    )
}
