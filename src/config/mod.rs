mod env_overrides;
mod loader;
#[cfg(test)]
mod test_env;
mod types;

pub use types::{
    BrowserConfig, Config, CredentialsConfig, RegistryConfig, SiteConfig, TimingConfig,
};
