use crate::browser::{
    LocatorChain, SiteLocators, UiDriver, UrlWait, is_authenticated_url, wait_for_url,
};
use crate::config::{Config, SiteConfig, TimingConfig};
use crate::error::{AuthenticationError, ConfigError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Authenticated browser context, owned by one run.
pub struct Session {
    driver: Box<dyn UiDriver>,
    entry: LoginEntry,
}

impl Session {
    pub fn driver(&self) -> &dyn UiDriver {
        self.driver.as_ref()
    }

    /// How the login form was reached.
    pub fn entry(&self) -> LoginEntry {
        self.entry
    }

    /// Tear the browser context down. Close failures are only logged.
    pub async fn close(self) {
        if let Err(e) = self.driver.close().await {
            warn!(driver = self.driver.name(), error = %e, "browser did not close cleanly");
        }
    }
}

/// Ways into the login form, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginEntry {
    /// Trigger element on the landing page opening an inline form.
    Trigger,
    /// Dedicated login route.
    Route,
}

const LOGIN_ENTRIES: &[LoginEntry] = &[LoginEntry::Trigger, LoginEntry::Route];

/// Turns one credential pair into an authenticated [`Session`].
pub struct SessionManager {
    email: String,
    password: String,
    site: SiteConfig,
    locators: SiteLocators,
    timing: TimingConfig,
}

impl SessionManager {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let email = config
            .credentials
            .email
            .clone()
            .filter(|e| !e.is_empty())
            .ok_or(ConfigError::Missing("credentials.email (NPOINT_EMAIL)"))?;
        let password = config
            .credentials
            .password
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::Missing(
                "credentials.password (NPOINT_PASSWORD)",
            ))?;
        Ok(Self {
            email,
            password,
            site: config.site.clone(),
            locators: config.locators.clone(),
            timing: config.timing.clone(),
        })
    }

    /// Log in through `driver`. On failure the driver is closed before the
    /// error is returned.
    pub async fn authenticate(
        &self,
        driver: Box<dyn UiDriver>,
    ) -> Result<Session, AuthenticationError> {
        match self.login(driver.as_ref()).await {
            Ok(entry) => Ok(Session { driver, entry }),
            Err(e) => {
                if let Err(close_err) = driver.close().await {
                    debug!(error = %close_err, "close after failed login");
                }
                Err(e)
            }
        }
    }

    async fn login(&self, driver: &dyn UiDriver) -> Result<LoginEntry, AuthenticationError> {
        // Headless runs have nobody to answer a permission prompt.
        let origin = self.site.origin();
        if let Err(e) = driver.grant_clipboard(&origin).await {
            warn!(origin = %origin, error = %e, "clipboard grant failed; direct input only");
        }

        let home = self.site.home_url();
        info!(url = %home, "opening site");
        driver
            .goto(&home)
            .await
            .map_err(|e| AuthenticationError::Navigation {
                url: home.clone(),
                message: e.to_string(),
            })?;
        if let Err(e) = driver.settle_network(self.timing.network_settle()).await {
            debug!(error = %e, "network did not go idle; continuing");
        }

        let entry = self.open_login_form(driver).await?;
        debug!(entry = ?entry, "login form open");

        self.fill(driver, &self.locators.email, &self.email, "email field")
            .await?;
        self.fill(
            driver,
            &self.locators.password,
            &self.password,
            "password field",
        )
        .await?;

        let submit = self
            .locators
            .submit
            .resolve(driver, self.timing.login_form(), self.timing.poll_interval())
            .await
            .locator()
            .ok_or(AuthenticationError::FormNotFound("submit button"))?;
        driver
            .click(&submit)
            .await
            .map_err(|e| AuthenticationError::Interaction(format!("submit: {e}")))?;

        // Absence of an error banner proves nothing; arrival in the
        // document area does.
        let doc_root = self.site.doc_root.as_str();
        match wait_for_url(
            driver,
            self.timing.login(),
            self.timing.poll_interval(),
            |url| is_authenticated_url(url, doc_root),
        )
        .await
        {
            UrlWait::Matched(url) => {
                info!(url = %url, "logged in");
                Ok(entry)
            }
            UrlWait::TimedOut(last_url) => Err(AuthenticationError::Timeout {
                timeout_ms: self.timing.login_ms,
                last_url,
            }),
        }
    }

    async fn open_login_form(
        &self,
        driver: &dyn UiDriver,
    ) -> Result<LoginEntry, AuthenticationError> {
        for entry in LOGIN_ENTRIES {
            match entry {
                LoginEntry::Trigger => {
                    let Some(trigger) = self
                        .locators
                        .login_trigger
                        .resolve(
                            driver,
                            self.timing.login_trigger(),
                            self.timing.poll_interval(),
                        )
                        .await
                        .locator()
                    else {
                        debug!("no login trigger on landing page");
                        continue;
                    };
                    if let Err(e) = driver.click(&trigger).await {
                        debug!(error = %e, "login trigger click failed");
                        continue;
                    }
                }
                LoginEntry::Route => {
                    let url = self.site.login_url();
                    driver
                        .goto(&url)
                        .await
                        .map_err(|e| AuthenticationError::Navigation {
                            url: url.clone(),
                            message: e.to_string(),
                        })?;
                }
            }

            if self
                .visible_within(driver, &self.locators.email, self.timing.login_form())
                .await
            {
                return Ok(*entry);
            }
            debug!(entry = ?entry, "login form did not appear");
        }
        Err(AuthenticationError::FormNotFound("email field"))
    }

    async fn visible_within(
        &self,
        driver: &dyn UiDriver,
        chain: &LocatorChain,
        bound: Duration,
    ) -> bool {
        chain
            .resolve(driver, bound, self.timing.poll_interval())
            .await
            .locator()
            .is_some()
    }

    async fn fill(
        &self,
        driver: &dyn UiDriver,
        chain: &LocatorChain,
        value: &str,
        what: &'static str,
    ) -> Result<(), AuthenticationError> {
        let locator = chain
            .resolve(driver, self.timing.login_form(), self.timing.poll_interval())
            .await
            .locator()
            .ok_or(AuthenticationError::FormNotFound(what))?;
        driver
            .fill(&locator, value)
            .await
            .map_err(|e| AuthenticationError::Interaction(format!("{what}: {e}")))
    }
}
