use crate::config::SiteConfig;
use crate::error::RegistryFetchError;
use reqwest::Client;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Read side of the registry document.
pub trait RegistrySource: Send + Sync {
    /// Current registry entries. Anything that is not a JSON list is an error.
    fn fetch(&self)
    -> Pin<Box<dyn Future<Output = Result<Vec<Value>, RegistryFetchError>> + Send + '_>>;
}

pub fn build_registry_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// The service's public, unauthenticated read endpoint.
pub struct HttpRegistrySource {
    client: Client,
    url: String,
}

impl HttpRegistrySource {
    pub fn new(site: &SiteConfig, bin_id: &str) -> Self {
        Self::with_client(build_registry_client(), site.public_url(bin_id))
    }

    pub fn with_client(client: Client, url: String) -> Self {
        Self { client, url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RegistrySource for HttpRegistrySource {
    fn fetch(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Value>, RegistryFetchError>> + Send + '_>> {
        Box::pin(async move {
            let response = self
                .client
                .get(&self.url)
                .send()
                .await
                .map_err(|e| RegistryFetchError::Request(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(RegistryFetchError::Status(status.as_u16()));
            }

            let body: Value = response
                .json()
                .await
                .map_err(|e| RegistryFetchError::Decode(e.to_string()))?;

            match body {
                Value::Array(entries) => Ok(entries),
                other => Err(RegistryFetchError::NotAList(kind(&other))),
            }
        })
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
