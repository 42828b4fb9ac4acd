//! Configuration file support for the connector CLI.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `GITLAB_CONNECTOR_`, e.g.,
//!    `GITLAB_CONNECTOR_ACCESS_TOKEN`)
//! 3. Config file (~/.config/gitlab-connector/config.toml or
//!    ./gitlab-connector.toml)
//! 4. Built-in defaults
//!
//! Example config file:
//! ```toml
//! access_token = "glpat-..."           # or GITLAB_CONNECTOR_ACCESS_TOKEN
//! base_url = "https://gitlab.com/"     # optional, this is the default
//! ```

use std::path::PathBuf;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

/// Default GitLab instance when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://gitlab.com/";

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitLab personal access token. Required for every command.
    pub access_token: Option<String>,
    /// Base URL of the GitLab instance.
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/gitlab-connector/config.toml)
    /// 3. Local config file (./gitlab-connector.toml)
    /// 4. Environment variables with GITLAB_CONNECTOR_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(proj_dirs) = ProjectDirs::from("", "", "gitlab-connector") {
            let xdg_config = proj_dirs.config_dir().join("config.toml");
            if xdg_config.exists() {
                tracing::debug!("Loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        let local_config = PathBuf::from("gitlab-connector.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./gitlab-connector.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g. GITLAB_CONNECTOR_ACCESS_TOKEN -> access_token
        builder = builder.add_source(Environment::with_prefix("GITLAB_CONNECTOR"));

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

    /// The access token, validated non-empty.
    pub fn access_token(&self) -> Result<&str, String> {
        match self.access_token.as_deref() {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(
                "no GitLab access token configured; set GITLAB_CONNECTOR_ACCESS_TOKEN, \
                 pass --access-token, or add access_token to the config file"
                    .to_string(),
            ),
        }
    }

    /// Get the default config file path.
    #[allow(dead_code)]
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "gitlab-connector")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
