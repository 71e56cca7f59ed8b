use super::Config;
use crate::error::ConfigError;
use directories::UserDirs;
use std::fs;
use std::path::{Path, PathBuf};

impl Config {
    /// Loads config from `explicit` if given, else `~/.binsync/config.toml`
    /// when it exists, else defaults. Environment overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::Load(format!(
                        "config file {} does not exist",
                        p.display()
                    )));
                }
                Some(p.to_path_buf())
            }
            None => default_config_path().filter(|p| p.exists()),
        };

        let mut config = match path {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Everything a publish run needs before a browser is launched.
    pub fn validate_for_publish(&self) -> Result<(), ConfigError> {
        if self.credentials.email.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::Missing("credentials.email (NPOINT_EMAIL)"));
        }
        if self.credentials.password.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::Missing(
                "credentials.password (NPOINT_PASSWORD)",
            ));
        }
        self.registry.require_bin_id()?;
        if let Err(e) = url::Url::parse(&self.site.base_url) {
            return Err(ConfigError::Invalid {
                key: "site.base_url",
                message: e.to_string(),
            });
        }
        Ok(())
    }
}

fn default_config_path() -> Option<PathBuf> {
    UserDirs::new().map(|u| u.home_dir().join(".binsync").join("config.toml"))
}
