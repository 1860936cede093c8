//! Authentication session for the Lectern content client
//!
//! This crate holds the signed-in state of the client and the calls that
//! produce it.
//!
//! # Session Lifecycle
//!
//! 1. The session is rehydrated from [`lc_core::StateStorage`] at start-up
//! 2. A login (password or identity provider) returns a token and a user
//!    summary, adopted with [`SessionStore::set_login_response`]; a bare
//!    token (OAuth redirect) is adopted with [`SessionStore::set_token`],
//!    which decodes its claims
//! 3. Every request made through an [`lc_core::ApiClient`] built with
//!    `with_bearer_auth(store)` carries `Authorization: Bearer <token>`
//! 4. [`SessionStore::logout`] or a malformed token clears the session
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use lc_auth::{AuthService, LoginPayload, SessionStore};
//! use lc_core::{ApiClient, ClientConfig, FileStateStorage};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = Arc::new(FileStateStorage::new(FileStateStorage::default_storage_dir()?)?);
//! let session = SessionStore::load(storage);
//!
//! let api = ApiClient::new(ClientConfig::from_env()?)?.with_bearer_auth(Arc::new(session.clone()));
//! let auth = AuthService::new(api);
//!
//! let response = auth
//!     .login(&LoginPayload {
//!         email: "a@b.com".to_string(),
//!         password: "secret".to_string(),
//!     })
//!     .await?;
//! session.set_login_response(response.token, response.user.into());
//!
//! println!("Signed in with tier {}", session.user_tier());
//! # Ok(())
//! # }
//! ```
//!
//! # Token Decoding
//!
//! Tokens are decoded structurally only:
//!
//! ```
//! use lc_auth::SessionStore;
//!
//! let session = SessionStore::in_memory();
//! assert!(session.set_token("not-a-token").is_err());
//! assert!(!session.is_logged_in());
//! ```
//!
//! # Important Notes
//!
//! - Token signatures and expiry are never verified client-side
//! - `set_login_response` trusts the backend user without cross-checking the token
//! - Tokens are persisted in plain JSON; the storage directory is owner-only on Unix

pub mod client;
pub mod errors;
pub mod models;
pub mod oauth;
pub mod session;
pub mod token;

pub use client::AuthService;
pub use errors::{AuthError, DecodeError, Result};
pub use models::{
    AuthResponse, AuthUser, IdentityClaims, LoginPayload, OAuthPayload, RegisterPayload,
    UserSummary,
};
pub use oauth::token_from_redirect;
pub use session::{Session, SessionStore};
