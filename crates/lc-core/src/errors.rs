use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while talking to the content API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error {status}: {message}")]
    Http {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Resource not found: {path}")]
    NotFound { path: String },

    #[error("JSON serialization/deserialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status carried by the error, if the server answered at all
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(reqwest::StatusCode::NOT_FOUND),
            Self::Network(e) => e.status(),
            Self::Serde(_) | Self::UrlParse(_) => None,
        }
    }
}

/// Errors produced by persisted client-side state
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Timed out waiting for the storage lock held by another process")]
    LockTimeout,

    #[error("Record '{key}' could not be encoded or decoded: {source}")]
    Corrupted {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid record key '{0}'")]
    InvalidKey(String),

    #[error("Lock poisoned")]
    Poisoned,

    #[error("Could not determine the platform data directory")]
    DirectoryUnavailable,
}

/// Errors produced while resolving client configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid API URL '{url}': {source}")]
    InvalidApiUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

pub type Result<T> = std::result::Result<T, ApiError>;
