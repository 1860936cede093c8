use lc_core::{ApiClient, endpoints};
use tracing::{debug, instrument};

use crate::errors::Result;
use crate::models::{
    AuthResponse, AuthUser, LoginPayload, OAuthPayload, ProfileResponse, RegisterPayload,
};

/// Client for the `/auth` endpoints.
///
/// Calls are plain pass-throughs: results are returned to the caller, which
/// decides how to feed them into a [`crate::SessionStore`].
#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Create an account
    #[instrument(skip(self, payload), fields(email = %payload.email))]
    pub async fn register(&self, payload: &RegisterPayload) -> Result<AuthResponse> {
        debug!("Registering account");
        Ok(self.api.post_json(endpoints::AUTH_REGISTER, payload).await?)
    }

    /// Log in with email and password
    #[instrument(skip(self, payload), fields(email = %payload.email))]
    pub async fn login(&self, payload: &LoginPayload) -> Result<AuthResponse> {
        debug!("Logging in");
        Ok(self.api.post_json(endpoints::AUTH_LOGIN, payload).await?)
    }

    /// Exchange an identity-provider profile for a platform token
    #[instrument(skip(self, payload), fields(provider = ?payload.provider))]
    pub async fn oauth_login(&self, payload: &OAuthPayload) -> Result<AuthResponse> {
        debug!("Logging in through identity provider");
        Ok(self.api.post_json(endpoints::AUTH_OAUTH, payload).await?)
    }

    /// Fetch the full identity of the current user
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<AuthUser> {
        debug!("Fetching user profile");
        let response: ProfileResponse = self.api.get_json(endpoints::AUTH_PROFILE).await?;
        Ok(response.user)
    }
}
