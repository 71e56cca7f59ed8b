use super::{Locator, LocatorChain};
use serde::{Deserialize, Serialize};

/// Locator candidates for every element the login, publish and registry
/// flows touch. Overridable from the `[locators]` config section when the
/// site changes its markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteLocators {
    pub login_trigger: LocatorChain,
    pub email: LocatorChain,
    pub password: LocatorChain,
    pub submit: LocatorChain,
    pub new_bin: LocatorChain,
    pub editor: LocatorChain,
    pub save: LocatorChain,
}

impl Default for SiteLocators {
    fn default() -> Self {
        Self {
            login_trigger: vec![
                Locator::css(".login-dropdown-component"),
                Locator::role("button", "log in"),
                Locator::role("link", "log in"),
            ]
            .into(),
            email: vec![
                Locator::role("textbox", "email"),
                Locator::css("input[type=\"email\"]"),
                Locator::css(".login-component input:first-of-type"),
            ]
            .into(),
            password: vec![
                Locator::css(".login-component input[type=\"password\"]"),
                Locator::css("input[type=\"password\"]"),
            ]
            .into(),
            submit: vec![
                Locator::css(".login-component button.button.primary"),
                Locator::role("button", "log in"),
                Locator::css("button[type=\"submit\"]"),
            ]
            .into(),
            new_bin: vec![
                Locator::text("button", "+ New"),
                Locator::role("button", "new"),
            ]
            .into(),
            // Widgets the site has shipped over time, newest first.
            editor: vec![
                Locator::css("#brace-editor"),
                Locator::css(".ace_editor"),
                Locator::css(".cm-editor .cm-content"),
                Locator::css(".CodeMirror"),
                Locator::css("textarea"),
            ]
            .into(),
            save: vec![
                Locator::text("button", "Save"),
                Locator::role("button", "save"),
            ]
            .into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_default_chain_has_candidates() {
        let l = SiteLocators::default();
        for chain in [
            &l.login_trigger,
            &l.email,
            &l.password,
            &l.submit,
            &l.new_bin,
            &l.editor,
            &l.save,
        ] {
            assert!(!chain.is_empty());
        }
        assert_eq!(l.editor.candidates()[0], Locator::css("#brace-editor"));
    }

    #[test]
    fn editor_candidates_can_be_overridden_from_toml() {
        let l: SiteLocators = toml::from_str(
            r#"
editor = [
    { by = "css", selector = ".monaco-editor" },
    { by = "role", role = "textbox", name = "json" },
]
"#,
        )
        .unwrap();
        assert_eq!(
            l.editor.candidates(),
            &[
                Locator::css(".monaco-editor"),
                Locator::role("textbox", "json"),
            ]
        );
        // untouched chains keep their defaults
        assert_eq!(l.save, SiteLocators::default().save);
    }
}
