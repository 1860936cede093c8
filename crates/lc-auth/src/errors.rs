use lc_core::ApiError;
use thiserror::Error;

/// Authentication error types
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("User cancelled the authentication flow")]
    UserCancelled,

    #[error("Invalid redirect URI or missing token")]
    InvalidRedirect,

    #[error("Invalid token: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Reasons a bearer token could not be decoded
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("token must have three dot-separated segments, found {0}")]
    Structure(usize),

    #[error("token segment {0} contains characters outside base64url")]
    Alphabet(usize),

    #[error("token payload segment is empty")]
    EmptyPayload,

    #[error("token payload is not valid base64url: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("token payload is not a valid claim set: {0}")]
    Payload(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AuthError>;
