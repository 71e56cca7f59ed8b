use crate::browser::SiteLocators;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path the config was read from - not serialized
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub credentials: CredentialsConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    /// Prioritized candidates for every UI element the flows touch
    #[serde(default)]
    pub locators: SiteLocators,
}

// ── Target site ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Web UI origin (default: https://www.npoint.io)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path segment under which documents are edited (default: docs)
    #[serde(default = "default_doc_root")]
    pub doc_root: String,
    /// Dedicated login page, used when no login trigger is on the landing page
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Public, unauthenticated read host (default: https://api.npoint.io)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_base_url() -> String {
    "https://www.npoint.io".into()
}

fn default_doc_root() -> String {
    "docs".into()
}

fn default_login_path() -> String {
    "/login".into()
}

fn default_api_base_url() -> String {
    "https://api.npoint.io".into()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            doc_root: default_doc_root(),
            login_path: default_login_path(),
            api_base_url: default_api_base_url(),
        }
    }
}

impl SiteConfig {
    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    fn root(&self) -> &str {
        self.doc_root.trim_matches('/')
    }

    /// Landing page the login flow starts from.
    pub fn home_url(&self) -> String {
        format!("{}/", self.base())
    }

    pub fn login_url(&self) -> String {
        format!("{}/{}", self.base(), self.login_path.trim_start_matches('/'))
    }

    /// Dashboard listing the account's documents.
    pub fn dashboard_url(&self) -> String {
        format!("{}/{}", self.base(), self.root())
    }

    /// Edit page of an existing bin.
    pub fn edit_url(&self, bin_id: &str) -> String {
        format!("{}/{}/{bin_id}", self.base(), self.root())
    }

    /// Public read URL of a bin.
    pub fn public_url(&self, bin_id: &str) -> String {
        format!("{}/{bin_id}", self.api_base_url.trim_end_matches('/'))
    }

    /// Origin clipboard permissions are granted for.
    pub fn origin(&self) -> String {
        url::Url::parse(&self.base_url)
            .map(|u| u.origin().ascii_serialization())
            .unwrap_or_else(|_| self.base().to_string())
    }
}

// ── Credentials ──────────────────────────────────────────────────

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// ── Registry ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Identifier of the bin holding the registry list
    #[serde(default)]
    pub bin_id: Option<String>,
}

impl RegistryConfig {
    /// The configured registry bin id; empty counts as unset.
    pub fn require_bin_id(&self) -> Result<&str, ConfigError> {
        self.bin_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::Missing("registry.bin_id (REGISTRY_BIN_ID)"))
    }
}

// ── Browser ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run without a visible window (default: false; CI forces it on)
    #[serde(default)]
    pub headless: bool,
    /// User agent presented to the site
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Chrome/Chromium binary; auto-detected when unset
    #[serde(default)]
    pub executable: Option<PathBuf>,
    /// Extra command-line switches passed to the browser
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36"
        .into()
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            user_agent: default_user_agent(),
            executable: None,
            args: Vec::new(),
        }
    }
}

// ── Timing ───────────────────────────────────────────────────────

/// Upper bounds for every wait in a run, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_navigation_ms")]
    pub navigation_ms: u64,
    #[serde(default = "default_network_settle_ms")]
    pub network_settle_ms: u64,
    #[serde(default = "default_login_trigger_ms")]
    pub login_trigger_ms: u64,
    #[serde(default = "default_login_form_ms")]
    pub login_form_ms: u64,
    #[serde(default = "default_login_ms")]
    pub login_ms: u64,
    #[serde(default = "default_create_control_ms")]
    pub create_control_ms: u64,
    #[serde(default = "default_dashboard_control_ms")]
    pub dashboard_control_ms: u64,
    #[serde(default = "default_bin_url_ms")]
    pub bin_url_ms: u64,
    #[serde(default = "default_editor_ms")]
    pub editor_ms: u64,
    #[serde(default = "default_save_settle_ms")]
    pub save_settle_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_navigation_ms() -> u64 {
    60_000
}

fn default_network_settle_ms() -> u64 {
    5_000
}

fn default_login_trigger_ms() -> u64 {
    10_000
}

fn default_login_form_ms() -> u64 {
    20_000
}

fn default_login_ms() -> u64 {
    30_000
}

fn default_create_control_ms() -> u64 {
    5_000
}

fn default_dashboard_control_ms() -> u64 {
    20_000
}

fn default_bin_url_ms() -> u64 {
    20_000
}

fn default_editor_ms() -> u64 {
    30_000
}

fn default_save_settle_ms() -> u64 {
    2_000
}

fn default_poll_interval_ms() -> u64 {
    250
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            navigation_ms: default_navigation_ms(),
            network_settle_ms: default_network_settle_ms(),
            login_trigger_ms: default_login_trigger_ms(),
            login_form_ms: default_login_form_ms(),
            login_ms: default_login_ms(),
            create_control_ms: default_create_control_ms(),
            dashboard_control_ms: default_dashboard_control_ms(),
            bin_url_ms: default_bin_url_ms(),
            editor_ms: default_editor_ms(),
            save_settle_ms: default_save_settle_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl TimingConfig {
    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn network_settle(&self) -> Duration {
        Duration::from_millis(self.network_settle_ms)
    }

    pub fn login_trigger(&self) -> Duration {
        Duration::from_millis(self.login_trigger_ms)
    }

    pub fn login_form(&self) -> Duration {
        Duration::from_millis(self.login_form_ms)
    }

    pub fn login(&self) -> Duration {
        Duration::from_millis(self.login_ms)
    }

    pub fn create_control(&self) -> Duration {
        Duration::from_millis(self.create_control_ms)
    }

    pub fn dashboard_control(&self) -> Duration {
        Duration::from_millis(self.dashboard_control_ms)
    }

    pub fn bin_url(&self) -> Duration {
        Duration::from_millis(self.bin_url_ms)
    }

    pub fn editor(&self) -> Duration {
        Duration::from_millis(self.editor_ms)
    }

    pub fn save_settle(&self) -> Duration {
        Duration::from_millis(self.save_settle_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}
