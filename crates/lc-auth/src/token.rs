//! Structural bearer-token decoding.
//!
//! Tokens are JWT-shaped: `header.payload.signature`, each segment
//! base64url-encoded. Only the payload is interpreted. The signature is
//! never verified and `exp` is never checked; both are the issuing
//! backend's responsibility.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::errors::DecodeError;
use crate::models::IdentityClaims;

/// Decode the identity claims from a bearer token without verifying it
pub fn decode(token: &str) -> Result<IdentityClaims, DecodeError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(DecodeError::Structure(segments.len()));
    }

    // the token is sent back verbatim as a header value
    for index in [0, 2] {
        if !segments[index].chars().all(is_base64_char) {
            return Err(DecodeError::Alphabet(index));
        }
    }

    // tolerate padded and standard-alphabet payloads
    let payload: String = segments[1]
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();
    if payload.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }

    let bytes = URL_SAFE_NO_PAD.decode(payload)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '/' | '=')
}
