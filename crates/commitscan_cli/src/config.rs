//! Configuration file support for commitscan.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `COMMITSCAN_`, sections separated by
//!    a double underscore, e.g. `COMMITSCAN_DEVOPS__TOKEN`)
//! 3. Config file (./commitscan.toml, then ~/.config/commitscan/config.toml)
//! 4. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [devops]
//! host = "https://dev.azure.com"  # optional, this is the default
//! organization = "contoso"
//! token = "..."  # or use COMMITSCAN_DEVOPS__TOKEN env var
//!
//! [search]
//! page_size = 1000
//! requests_per_second = 10
//! no_rate_limit = false
//! ```

use std::path::PathBuf;

use commitscan::platform::DEVOPS_DEFAULT_RPS;
use commitscan::search::PAGE_SIZE;
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

/// Prefix of the environment variables read as configuration.
const ENV_PREFIX: &str = "COMMITSCAN";

/// Default Azure DevOps host.
pub use commitscan::devops::DEVOPS_HOST as DEFAULT_HOST;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Azure DevOps connection settings.
    pub devops: DevOpsConfig,
    /// Default search options.
    pub search: SearchConfig,
}

/// Azure DevOps configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DevOpsConfig {
    /// Base URL of the service, e.g. "https://dev.azure.com".
    pub host: String,
    /// Organization searched when `--organization` is not given.
    pub organization: Option<String>,
    /// Personal access token with read access to code.
    pub token: Option<String>,
}

impl Default for DevOpsConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            organization: None,
            token: None,
        }
    }
}

/// Default search options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Commits requested per page.
    pub page_size: usize,
    /// Proactive request pacing.
    pub requests_per_second: u32,
    /// Whether to disable proactive rate limiting.
    pub no_rate_limit: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            requests_per_second: DEVOPS_DEFAULT_RPS,
            no_rate_limit: false,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/commitscan/config.toml)
    /// 3. Local config file (./commitscan.toml)
    /// 4. Environment variables with COMMITSCAN_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("commitscan.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./commitscan.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g., COMMITSCAN_SEARCH__PAGE_SIZE -> search.page_size
        builder = builder.add_source(environment());

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the Azure DevOps token, ignoring blank values.
    pub fn token(&self) -> Option<String> {
        self.devops
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "commitscan").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Environment source for `COMMITSCAN_<SECTION>__<KEY>` variables.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
