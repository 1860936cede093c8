use chrono::{DateTime, Utc};
use lc_core::Tier;
use serde::{Deserialize, Serialize};

/// Identity of the signed-in user as held by the session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    /// Numeric user id. Some profile payloads omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub tier: Tier,
    /// Identity provider name for OAuth accounts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Provider-assigned account id
    #[serde(
        rename = "providerId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub provider_id: Option<String>,
    /// Issued-at, seconds since the epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Expiry, seconds since the epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl AuthUser {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat.and_then(|s| DateTime::from_timestamp(s, 0))
    }

    /// Expiry reported by the token. Informational only; the client never
    /// enforces it.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|s| DateTime::from_timestamp(s, 0))
    }

    /// Best display name: username, falling back to the email
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.email)
    }
}

/// Claims carried in the payload segment of a bearer token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentityClaims {
    pub id: i64,
    pub email: String,
    pub tier: Tier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(
        rename = "providerId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub provider_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl From<IdentityClaims> for AuthUser {
    fn from(claims: IdentityClaims) -> Self {
        Self {
            id: Some(claims.id),
            email: claims.email,
            username: claims.username,
            avatar: claims.avatar,
            tier: claims.tier,
            provider: claims.provider,
            provider_id: claims.provider_id,
            iat: claims.iat,
            exp: claims.exp,
        }
    }
}

/// User summary returned alongside a token by register/login/oauth
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub tier: Tier,
}

impl From<UserSummary> for AuthUser {
    fn from(summary: UserSummary) -> Self {
        Self {
            id: Some(summary.id),
            email: summary.email,
            username: None,
            avatar: None,
            tier: summary.tier,
            provider: None,
            provider_id: None,
            iat: None,
            exp: None,
        }
    }
}

/// Response of the register, login and oauth endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserSummary,
}

/// Envelope of the profile endpoint
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProfileResponse {
    pub user: AuthUser,
}

/// Register request body
#[derive(Clone, Serialize)]
pub struct RegisterPayload {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
}

impl std::fmt::Debug for RegisterPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterPayload")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("tier", &self.tier)
            .finish()
    }
}

/// Login request body
#[derive(Clone, Serialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginPayload")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// OAuth login request body, built from the identity provider's profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OAuthPayload {
    pub email: String,
    pub username: String,
    pub avatar: String,
    pub provider: Option<String>,
    #[serde(rename = "providerId")]
    pub provider_id: String,
    pub tier: Tier,
}
