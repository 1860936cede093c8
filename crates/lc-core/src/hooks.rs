use std::sync::Arc;

use reqwest::Request;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use tracing::warn;

/// Supplies the bearer token attached to outgoing requests
pub trait TokenSource: Send + Sync {
    /// Current token, `None` when there is no session
    fn bearer_token(&self) -> Option<String>;
}

/// A pre-request hook run on every request before it is sent.
///
/// Hooks run in registration order and see the fully built request.
pub trait RequestHook: Send + Sync {
    fn before_send(&self, request: &mut Request);
}

/// Attaches `Authorization: Bearer <token>` while a session token is present
#[derive(Clone)]
pub struct BearerAuth {
    source: Arc<dyn TokenSource>,
}

impl BearerAuth {
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self { source }
    }
}

impl std::fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerAuth")
    }
}

impl RequestHook for BearerAuth {
    fn before_send(&self, request: &mut Request) {
        let Some(token) = self.source.bearer_token().filter(|t| !t.is_empty()) else {
            return;
        };

        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Err(_) => {
                warn!("Session token is not a valid header value, sending request without it");
            }
        }
    }
}
