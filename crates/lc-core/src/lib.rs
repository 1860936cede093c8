//! Shared plumbing for the Lectern content client
//!
//! This crate owns everything the auth and content crates have in common:
//!
//! - [`ClientConfig`]: API base URL and transport settings, resolved from an
//!   optional `config.toml` and the `LECTERN_API_URL` environment variable
//! - [`ApiClient`]: the HTTP client. Every request passes through an ordered
//!   list of [`RequestHook`]s; [`BearerAuth`] attaches the session token
//! - [`StateStorage`]: synchronous durable storage for the persisted
//!   `session` and `progress` records
//! - [`Tier`]: the access tier shared by users and content
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use lc_core::{ApiClient, ClientConfig, TokenSource};
//!
//! struct Anonymous;
//!
//! impl TokenSource for Anonymous {
//!     fn bearer_token(&self) -> Option<String> {
//!         None
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(ClientConfig::from_env()?)?
//!     .with_bearer_auth(Arc::new(Anonymous));
//! let body: serde_json::Value = client.get_json("/articles").await?;
//! println!("{}", body);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod errors;
pub mod file_storage;
pub mod hooks;
pub mod storage;
pub mod tier;

pub use client::ApiClient;
pub use config::{ClientConfig, HttpTimeouts, endpoints};
pub use errors::{ApiError, ConfigError, Result, StorageError};
pub use file_storage::FileStateStorage;
pub use hooks::{BearerAuth, RequestHook, TokenSource};
pub use storage::{
    MemoryStateStorage, PROGRESS_KEY, SESSION_KEY, StateStorage, StateStorageExt,
};
pub use tier::Tier;
