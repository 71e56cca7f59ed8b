use super::Config;
use std::path::PathBuf;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(email) = std::env::var("NPOINT_EMAIL")
            && !email.is_empty()
        {
            self.credentials.email = Some(email);
        }

        if let Ok(password) = std::env::var("NPOINT_PASSWORD")
            && !password.is_empty()
        {
            self.credentials.password = Some(password);
        }

        if let Ok(bin_id) = std::env::var("REGISTRY_BIN_ID")
            && !bin_id.is_empty()
        {
            self.registry.bin_id = Some(bin_id);
        }

        if let Ok(headless) = std::env::var("BINSYNC_HEADLESS")
            && let Some(flag) = parse_flag(&headless)
        {
            self.browser.headless = flag;
        }

        // CI runners have no display.
        if std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true") {
            self.browser.headless = true;
        }

        if let Ok(chrome) = std::env::var("BINSYNC_CHROME")
            && !chrome.is_empty()
        {
            self.browser.executable = Some(PathBuf::from(chrome));
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
