use std::collections::HashMap;

use tracing::{debug, instrument};
use url::Url;

use crate::errors::{AuthError, Result};

/// Extract the platform token from the identity-provider redirect
/// (`.../oauth-success?token=...`).
///
/// The result is meant for [`crate::SessionStore::set_token`].
#[instrument(skip_all)]
pub fn token_from_redirect(redirect_url: &str) -> Result<String> {
    let url = Url::parse(redirect_url)?;
    let params: HashMap<_, _> = url.query_pairs().collect();

    if let Some(error) = params.get("error") {
        debug!("Provider redirect reported error '{}'", error);
        if error == "access_denied" {
            return Err(AuthError::UserCancelled);
        }
        return Err(AuthError::InvalidRedirect);
    }

    params
        .get("token")
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or(AuthError::InvalidRedirect)
}
