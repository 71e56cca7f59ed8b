//! In-memory stand-in for the target site, driven through [`UiDriver`].

use super::{Key, Locator, LocatorChain, SiteLocators, UiDriver, UiFuture};
use crate::config::{SiteConfig, TimingConfig};
use anyhow::{anyhow, bail};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginSurface {
    /// Landing page has a trigger that opens an inline form.
    Dropdown,
    /// Only the dedicated login route shows the form.
    LoginPage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    LoginTrigger,
    Email,
    Password,
    Submit,
    NewBin,
    Editor,
    Save,
}

#[derive(Debug)]
pub struct SimState {
    pub url: String,
    pub login_open: bool,
    pub logged_in: bool,
    pub typed: HashMap<Element, String>,
    pub editor_focused: bool,
    pub selected_all: bool,
    pub buffer: String,
    pub clipboard: Option<String>,
    pub documents: HashMap<String, String>,
    pub granted_origins: Vec<String>,
    pub visited: Vec<String>,
    pub created: Vec<String>,
    pub pastes: usize,
    pub direct_inserts: usize,
    pub saves: usize,
    pub closed: bool,

    // behavior knobs
    pub surface: LoginSurface,
    pub credentials: (String, String),
    pub new_button_everywhere: bool,
    pub next_ids: VecDeque<String>,
    pub draft_content: String,
    pub clipboard_denied: bool,
    pub insert_denied: bool,
    pub paste_drops_text: bool,
    /// Paste shortcut is swallowed without an error.
    pub paste_ignored: bool,
    /// Creation indices (0-based) whose edit page never shows an editor.
    pub broken_editor_on: Vec<usize>,
    pub save_fails: bool,
    /// Active candidate per element; anything else is "not on the page".
    pub active: HashMap<Element, usize>,
}

/// Cloneable handle; clones share one simulated page.
#[derive(Clone)]
pub struct SimDriver {
    pub state: Arc<Mutex<SimState>>,
    site: SiteConfig,
    locators: SiteLocators,
}

impl SimDriver {
    pub fn new(site: SiteConfig, locators: SiteLocators) -> Self {
        let state = SimState {
            url: "about:blank".into(),
            login_open: false,
            logged_in: false,
            typed: HashMap::new(),
            editor_focused: false,
            selected_all: false,
            buffer: String::new(),
            clipboard: None,
            documents: HashMap::new(),
            granted_origins: Vec::new(),
            visited: Vec::new(),
            created: Vec::new(),
            pastes: 0,
            direct_inserts: 0,
            saves: 0,
            closed: false,
            surface: LoginSurface::Dropdown,
            credentials: ("me@example.com".into(), "hunter2".into()),
            new_button_everywhere: true,
            next_ids: VecDeque::from(vec![
                "abc123".to_string(),
                "def456".to_string(),
                "ghi789".to_string(),
            ]),
            draft_content: "{}".into(),
            clipboard_denied: false,
            insert_denied: false,
            paste_drops_text: false,
            paste_ignored: false,
            broken_editor_on: Vec::new(),
            save_fails: false,
            active: HashMap::new(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            site,
            locators,
        }
    }

    pub fn with<F: FnOnce(&mut SimState)>(self, f: F) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn snapshot<T, F: FnOnce(&SimState) -> T>(&self, f: F) -> T {
        f(&self.state.lock().unwrap())
    }

    /// Seed an existing, logged-in document (e.g. the registry bin).
    pub fn seed_document(&self, bin_id: &str, content: &str) {
        self.state
            .lock()
            .unwrap()
            .documents
            .insert(bin_id.to_string(), content.to_string());
    }

    fn chain(&self, element: Element) -> &LocatorChain {
        match element {
            Element::LoginTrigger => &self.locators.login_trigger,
            Element::Email => &self.locators.email,
            Element::Password => &self.locators.password,
            Element::Submit => &self.locators.submit,
            Element::NewBin => &self.locators.new_bin,
            Element::Editor => &self.locators.editor,
            Element::Save => &self.locators.save,
        }
    }

    fn element_for(&self, state: &SimState, locator: &Locator) -> Option<Element> {
        [
            Element::LoginTrigger,
            Element::Email,
            Element::Password,
            Element::Submit,
            Element::NewBin,
            Element::Editor,
            Element::Save,
        ]
        .into_iter()
        .find(|e| {
            let active = state.active.get(e).copied().unwrap_or(0);
            self.chain(*e).candidates().get(active) == Some(locator)
        })
    }

    fn path<'a>(&self, url: &'a str) -> &'a str {
        let base = self.site.base_url.trim_end_matches('/');
        url.strip_prefix(base).unwrap_or("")
    }

    fn edit_id(&self, url: &str) -> Option<String> {
        let root = format!("/{}/", self.site.doc_root.trim_matches('/'));
        self.path(url)
            .strip_prefix(&root)
            .filter(|id| !id.is_empty() && !id.contains('/'))
            .map(str::to_string)
    }

    fn present(&self, state: &SimState, element: Element) -> bool {
        let path = self.path(&state.url);
        let on_home = path == "/" || path.is_empty();
        let on_login = path == self.site.login_path;
        let on_dashboard = path == format!("/{}", self.site.doc_root.trim_matches('/'));
        let on_edit = self.edit_id(&state.url).is_some();
        let form_shown = match state.surface {
            LoginSurface::Dropdown => on_home && state.login_open,
            LoginSurface::LoginPage => on_login,
        };

        match element {
            Element::LoginTrigger => {
                state.surface == LoginSurface::Dropdown && on_home && !state.logged_in
            }
            Element::Email | Element::Password | Element::Submit => {
                form_shown && !state.logged_in
            }
            Element::NewBin => {
                state.logged_in && (on_dashboard || (on_edit && state.new_button_everywhere))
            }
            Element::Editor => {
                let broken = self.edit_id(&state.url).is_some_and(|id| {
                    state
                        .created
                        .iter()
                        .position(|c| *c == id)
                        .is_some_and(|i| state.broken_editor_on.contains(&i))
                });
                state.logged_in && on_edit && !broken
            }
            Element::Save => state.logged_in && on_edit,
        }
    }

    fn visible(&self, state: &SimState, locator: &Locator) -> Option<Element> {
        self.element_for(state, locator)
            .filter(|e| self.present(state, *e))
    }

    fn open(&self, state: &mut SimState, url: &str) {
        state.url = url.to_string();
        state.visited.push(url.to_string());
        state.editor_focused = false;
        state.selected_all = false;
        if let Some(id) = self.edit_id(url) {
            state.buffer = state.documents.get(&id).cloned().unwrap_or_default();
        }
    }

    fn type_into_editor(state: &mut SimState, text: &str) {
        if state.selected_all {
            state.buffer.clear();
            state.selected_all = false;
        }
        state.buffer.push_str(text);
    }
}

impl UiDriver for SimDriver {
    fn name(&self) -> &str {
        "sim"
    }

    fn grant_clipboard<'a>(&'a self, origin: &'a str) -> UiFuture<'a, ()> {
        Box::pin(async move {
            self.state
                .lock()
                .unwrap()
                .granted_origins
                .push(origin.to_string());
            Ok(())
        })
    }

    fn goto<'a>(&'a self, url: &'a str) -> UiFuture<'a, ()> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            self.open(&mut state, url);
            Ok(())
        })
    }

    fn settle_network(&self, _bound: Duration) -> UiFuture<'_, ()> {
        Box::pin(async move { bail!("analytics beacon keeps the network busy") })
    }

    fn current_url(&self) -> UiFuture<'_, String> {
        Box::pin(async move { Ok(self.state.lock().unwrap().url.clone()) })
    }

    fn is_visible<'a>(&'a self, locator: &'a Locator) -> UiFuture<'a, bool> {
        Box::pin(async move {
            let state = self.state.lock().unwrap();
            Ok(self.visible(&state, locator).is_some())
        })
    }

    fn click<'a>(&'a self, locator: &'a Locator) -> UiFuture<'a, ()> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            let element = self
                .visible(&state, locator)
                .ok_or_else(|| anyhow!("no visible element for {locator}"))?;
            state.editor_focused = element == Element::Editor;
            match element {
                Element::LoginTrigger => state.login_open = true,
                Element::Submit => {
                    let email = state.typed.get(&Element::Email).cloned().unwrap_or_default();
                    let pw = state
                        .typed
                        .get(&Element::Password)
                        .cloned()
                        .unwrap_or_default();
                    if (email, pw) == state.credentials {
                        state.logged_in = true;
                        let dashboard = self.site.dashboard_url();
                        self.open(&mut state, &dashboard);
                    }
                }
                Element::NewBin => {
                    let id = state
                        .next_ids
                        .pop_front()
                        .ok_or_else(|| anyhow!("server refused to create a bin"))?;
                    let draft = state.draft_content.clone();
                    state.documents.insert(id.clone(), draft);
                    state.created.push(id.clone());
                    let url = self.site.edit_url(&id);
                    self.open(&mut state, &url);
                }
                Element::Save => {
                    if state.save_fails {
                        bail!("save request failed");
                    }
                    let id = self
                        .edit_id(&state.url)
                        .ok_or_else(|| anyhow!("save outside an edit page"))?;
                    let buffer = state.buffer.clone();
                    state.documents.insert(id, buffer);
                    state.saves += 1;
                }
                Element::Email | Element::Password | Element::Editor => {}
            }
            Ok(())
        })
    }

    fn fill<'a>(&'a self, locator: &'a Locator, value: &'a str) -> UiFuture<'a, ()> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            let element = self
                .visible(&state, locator)
                .ok_or_else(|| anyhow!("no visible element for {locator}"))?;
            state.typed.insert(element, value.to_string());
            Ok(())
        })
    }

    fn press(&self, key: Key) -> UiFuture<'_, ()> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            if !state.editor_focused {
                return Ok(());
            }
            match key {
                Key::SelectAll => state.selected_all = true,
                Key::Backspace => {
                    if state.selected_all {
                        state.buffer.clear();
                        state.selected_all = false;
                    } else {
                        state.buffer.pop();
                    }
                }
                Key::Paste => {
                    let text = state.clipboard.clone().unwrap_or_default();
                    state.pastes += 1;
                    if state.paste_ignored {
                        return Ok(());
                    }
                    if state.paste_drops_text {
                        // paste shortcut swallowed half way through
                        let half: String = text.chars().take(text.chars().count() / 2).collect();
                        Self::type_into_editor(&mut state, &half);
                        bail!("paste interrupted");
                    }
                    Self::type_into_editor(&mut state, &text);
                }
            }
            Ok(())
        })
    }

    fn write_clipboard<'a>(&'a self, text: &'a str) -> UiFuture<'a, ()> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            if state.clipboard_denied {
                bail!("NotAllowedError: Write permission denied.");
            }
            state.clipboard = Some(text.to_string());
            Ok(())
        })
    }

    fn insert_text<'a>(&'a self, text: &'a str) -> UiFuture<'a, ()> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            if state.insert_denied {
                bail!("Input.insertText failed");
            }
            if !state.editor_focused {
                bail!("nothing focused");
            }
            state.direct_inserts += 1;
            Self::type_into_editor(&mut state, text);
            Ok(())
        })
    }

    fn close(&self) -> UiFuture<'_, ()> {
        Box::pin(async move {
            self.state.lock().unwrap().closed = true;
            Ok(())
        })
    }
}

/// Bounds small enough that a test never waits noticeably.
pub fn fast_timing() -> TimingConfig {
    TimingConfig {
        navigation_ms: 50,
        network_settle_ms: 5,
        login_trigger_ms: 20,
        login_form_ms: 20,
        login_ms: 50,
        create_control_ms: 20,
        dashboard_control_ms: 20,
        bin_url_ms: 50,
        editor_ms: 20,
        save_settle_ms: 1,
        poll_interval_ms: 1,
    }
}
