//! Application configuration.

use std::path::Path;

use anyhow::Context as _;
use figment::{Figment, providers::Format as _};
use serde::Deserialize;
use url::Url;

/// Top-level configuration for the data layer.
#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the application API.
    pub api_base: Url,
    /// Backing-store credentials. When absent, they are fetched from the
    /// application API on first use (see [`crate::store::StoreClient`]).
    pub store: Option<StoreConfig>,
}

/// Credentials for the backing tabular store: one URL plus an api-key that
/// doubles as the bearer token for anonymous access.
#[derive(Deserialize, Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the store's REST interface.
    pub url: Url,
    /// The api key, sent as both `apikey` and `Authorization: Bearer`.
    pub key: String,
}

impl AppConfig {
    /// Load configuration from a TOML file merged with `CREATIVE_HUB_`
    /// prefixed environment variables. The file may be absent; every setting
    /// can come from the environment.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        Figment::new()
            .admerge(figment::providers::Toml::file(path))
            .admerge(figment::providers::Env::prefixed("CREATIVE_HUB_"))
            .extract()
            .context("failed to load configuration")
    }
}
