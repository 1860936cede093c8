use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::errors::ConfigError;

/// Base URL used when neither the config file nor the environment sets one
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Environment variable selecting the API base URL
pub const API_URL_ENV: &str = "LECTERN_API_URL";

/// Relative API endpoints
pub mod endpoints {
    pub const AUTH_REGISTER: &str = "/auth/register";
    pub const AUTH_LOGIN: &str = "/auth/login";
    pub const AUTH_OAUTH: &str = "/auth/oauth";
    pub const AUTH_PROFILE: &str = "/auth/profile";
    pub const ARTICLES: &str = "/articles";
    pub const VIDEOS: &str = "/videos";
}

/// HTTP client timeouts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub connect: Duration,
    pub request: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(15),
            request: Duration::from_secs(30),
        }
    }
}

/// On-disk shape of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    api_url: Option<String>,
    connect_timeout_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    user_agent: Option<String>,
}

/// Configuration for [`crate::ApiClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL, stored without a trailing slash
    api_url: String,

    /// HTTP client timeouts
    pub http_timeouts: HttpTimeouts,

    /// Custom user agent (optional)
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// Create a config pointing at `api_url`
    pub fn new(api_url: impl AsRef<str>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: normalize_api_url(api_url.as_ref())?,
            http_timeouts: HttpTimeouts::default(),
            user_agent: Some(default_user_agent()),
        })
    }

    /// Defaults overridden by `LECTERN_API_URL` when it is set
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_api_url_override(std::env::var(API_URL_ENV).ok())
    }

    /// Resolve the configuration: defaults, then the TOML file, then the environment.
    ///
    /// An explicit `path` must exist. Without one, the platform config file is
    /// read only if present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let file = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_config_path().filter(|p| p.exists()),
        };

        if let Some(file) = file {
            config = config.merge_file(&file)?;
        }

        config.with_api_url_override(std::env::var(API_URL_ENV).ok())
    }

    /// Location of `config.toml` for the current platform
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "lectern")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Replace the base URL when `value` is a non-blank string
    pub fn with_api_url_override(mut self, value: Option<String>) -> Result<Self, ConfigError> {
        if let Some(url) = value.filter(|v| !v.trim().is_empty()) {
            debug!("Overriding API URL with {}", url);
            self.api_url = normalize_api_url(&url)?;
        }
        Ok(self)
    }

    fn merge_file(mut self, path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: FileConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Loaded client config from {}", path.display());

        if let Some(url) = file.api_url {
            self.api_url = normalize_api_url(&url)?;
        }
        if let Some(secs) = file.connect_timeout_secs {
            self.http_timeouts.connect = Duration::from_secs(secs);
        }
        if let Some(secs) = file.request_timeout_secs {
            self.http_timeouts.request = Duration::from_secs(secs);
        }
        if file.user_agent.is_some() {
            self.user_agent = file.user_agent;
        }

        Ok(self)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Absolute URL for a relative endpoint such as `/articles`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            http_timeouts: HttpTimeouts::default(),
            user_agent: Some(default_user_agent()),
        }
    }
}

fn default_user_agent() -> String {
    format!("lectern/{}", env!("CARGO_PKG_VERSION"))
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    Url::parse(trimmed).map_err(|source| ConfigError::InvalidApiUrl {
        url: raw.to_string(),
        source,
    })?;
    Ok(trimmed.to_string())
}
