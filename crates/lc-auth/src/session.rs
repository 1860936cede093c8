use std::sync::{Arc, PoisonError, RwLock};

use lc_core::{
    MemoryStateStorage, SESSION_KEY, StateStorage, StateStorageExt, Tier, TokenSource,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::client::AuthService;
use crate::errors::DecodeError;
use crate::models::AuthUser;
use crate::token;

/// Authentication session: the bearer token and the identity derived from it.
///
/// `user` is set exactly when `token` is non-empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    /// Bearer token, empty when signed out
    pub token: String,
    pub user: Option<AuthUser>,
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Tier of the signed-in user, `Free` when signed out
    pub fn user_tier(&self) -> Tier {
        self.user.as_ref().map(|u| u.tier).unwrap_or_default()
    }

    fn is_consistent(&self) -> bool {
        self.token.is_empty() == self.user.is_none()
    }

    fn user_display(&self) -> &str {
        self.user.as_ref().map(AuthUser::display_name).unwrap_or("")
    }
}

/// Owner of the current [`Session`].
///
/// Every mutation replaces the whole session under one write guard and
/// persists it to the `session` record before the guard is released, so
/// neither readers nor the persisted copy can observe a half-applied change.
/// Clones share the same session.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<RwLock<Session>>,
    storage: Arc<dyn StateStorage>,
}

impl SessionStore {
    /// Rehydrate the session persisted in `storage`.
    ///
    /// Missing, unreadable or inconsistent records yield an empty session.
    pub fn load(storage: Arc<dyn StateStorage>) -> Self {
        let session = match storage.load::<Session>(SESSION_KEY) {
            Ok(Some(session)) if session.is_consistent() => {
                if session.is_logged_in() {
                    info!("Restored session for {}", session.user_display());
                }
                session
            }
            Ok(Some(_)) => {
                warn!("Discarding persisted session with a token/user mismatch");
                Session::default()
            }
            Ok(None) => Session::default(),
            Err(e) => {
                warn!("Failed to load persisted session: {}", e);
                Session::default()
            }
        };

        Self {
            state: Arc::new(RwLock::new(session)),
            storage,
        }
    }

    /// Session store backed by process memory only
    pub fn in_memory() -> Self {
        Self::load(Arc::new(MemoryStateStorage::new()))
    }

    /// Decode `token` and adopt it with its claims.
    ///
    /// On a decode failure the session is cleared and the error returned for
    /// reporting; the store is left signed out, never half-set.
    #[instrument(skip_all)]
    pub fn set_token(&self, token: impl Into<String>) -> Result<(), DecodeError> {
        let token = token.into();

        match token::decode(&token) {
            Ok(claims) => {
                debug!("Adopting token for user {}", claims.id);
                self.replace(Session {
                    token,
                    user: Some(claims.into()),
                });
                Ok(())
            }
            Err(e) => {
                error!("Invalid token, clearing session: {}", e);
                self.replace(Session::default());
                Err(e)
            }
        }
    }

    /// Adopt a token and user exactly as returned by the backend, without decoding
    pub fn set_login_response(&self, token: impl Into<String>, user: AuthUser) {
        let token = token.into();
        if token.is_empty() {
            warn!("Login response carried an empty token, clearing session");
            self.replace(Session::default());
            return;
        }

        self.replace(Session {
            token,
            user: Some(user),
        });
    }

    /// Clear the session. Idempotent.
    pub fn logout(&self) {
        debug!("Clearing session");
        self.replace(Session::default());
    }

    /// Refresh the user from the profile endpoint.
    ///
    /// Failures are logged and leave the session untouched. A profile that
    /// arrives after the session was cleared or replaced is discarded.
    /// Returns the new user when it was applied.
    #[instrument(skip_all)]
    pub async fn fetch_user_profile(&self, auth: &AuthService) -> Option<AuthUser> {
        let requested_with = self.token();

        let user = match auth.profile().await {
            Ok(user) => user,
            Err(e) => {
                error!("Failed to fetch user profile: {}", e);
                return None;
            }
        };

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.token.is_empty() || state.token != requested_with {
            warn!("Session changed while the profile was loading, discarding it");
            return None;
        }

        state.user = Some(user.clone());
        self.persist(&state);
        Some(user)
    }

    pub fn is_logged_in(&self) -> bool {
        self.read().is_logged_in()
    }

    pub fn user_tier(&self) -> Tier {
        self.read().user_tier()
    }

    pub fn token(&self) -> String {
        self.read().token.clone()
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.read().user.clone()
    }

    /// Copy of the whole session
    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn replace(&self, next: Session) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = next;
        self.persist(&state);
    }

    fn persist(&self, session: &Session) {
        if let Err(e) = self.storage.save(SESSION_KEY, session) {
            error!("Failed to persist session: {}", e);
        }
    }
}

impl TokenSource for SessionStore {
    fn bearer_token(&self) -> Option<String> {
        let state = self.read();
        (!state.token.is_empty()).then(|| state.token.clone())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("SessionStore")
            .field("token", &if state.token.is_empty() { "" } else { "[REDACTED]" })
            .field("user", &state.user)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use lc_core::{ApiClient, BearerAuth, ClientConfig, FileStateStorage, RequestHook};
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_token(claims: serde_json::Value) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#),
            URL_SAFE_NO_PAD.encode(claims.to_string())
        )
    }

    fn valid_token() -> String {
        make_token(json!({"id": 5, "email": "e@f.com", "tier": "basic", "username": "ef"}))
    }

    fn summary_user() -> AuthUser {
        AuthUser {
            id: Some(1),
            email: "a@b.com".to_string(),
            username: None,
            avatar: None,
            tier: Tier::Free,
            provider: None,
            provider_id: None,
            iat: None,
            exp: None,
        }
    }

    fn auth_for(server_uri: &str, store: &SessionStore) -> AuthService {
        let config = ClientConfig::new(format!("{}/api", server_uri)).unwrap();
        let api = ApiClient::new(config)
            .unwrap()
            .with_bearer_auth(Arc::new(store.clone()));
        AuthService::new(api)
    }

    #[test]
    fn test_starts_signed_out() {
        let store = SessionStore::in_memory();
        assert_eq!(store.token(), "");
        assert!(store.user().is_none());
        assert!(!store.is_logged_in());
        assert_eq!(store.user_tier(), Tier::Free);
        assert!(store.bearer_token().is_none());
    }

    #[test]
    fn test_set_valid_token() {
        let store = SessionStore::in_memory();
        let token = valid_token();

        store.set_token(token.clone()).unwrap();

        let expected: AuthUser = token::decode(&token).unwrap().into();
        assert_eq!(store.token(), token);
        assert_eq!(store.user(), Some(expected));
        assert!(store.is_logged_in());
        assert_eq!(store.user_tier(), Tier::Basic);
        assert_eq!(store.bearer_token(), Some(token));
    }

    #[test]
    fn test_invalid_tokens_clear_session() {
        let store = SessionStore::in_memory();
        let missing_claims = make_token(json!({"id": 1}));

        for bad in ["", "garbage", "a.b", "a..c", "x.%%%.y", missing_claims.as_str()] {
            store.set_token(valid_token()).unwrap();
            assert!(store.is_logged_in());

            assert!(store.set_token(bad).is_err());
            assert_eq!(store.snapshot(), Session::default(), "token {:?}", bad);
        }
    }

    #[test]
    fn test_adopted_token_is_sendable() {
        let store = Arc::new(SessionStore::in_memory());

        assert!(store.set_token(format!("{}\n", valid_token())).is_err());
        assert!(!store.is_logged_in());
        assert_eq!(store.token(), "");

        store.set_token(valid_token()).unwrap();
        let hook = BearerAuth::new(store.clone());
        let mut request = reqwest::Request::new(
            reqwest::Method::GET,
            "http://localhost/api/articles".parse().unwrap(),
        );
        hook.before_send(&mut request);

        assert_eq!(
            request.headers()["Authorization"].to_str().unwrap(),
            format!("Bearer {}", valid_token())
        );
    }

    #[test]
    fn test_login_response_scenario() {
        let store = SessionStore::in_memory();

        store.set_login_response("abc", summary_user());

        assert_eq!(store.token(), "abc");
        assert_eq!(store.user(), Some(summary_user()));
        assert_eq!(store.user_tier(), Tier::Free);
        assert!(store.is_logged_in());
    }

    #[test]
    fn test_login_response_skips_decode() {
        let store = SessionStore::in_memory();
        let token = valid_token();

        // backend user wins even when the token says otherwise
        store.set_login_response(token.clone(), summary_user());

        assert_eq!(store.token(), token);
        assert_eq!(store.user().unwrap().email, "a@b.com");
    }

    #[test]
    fn test_logout_is_idempotent() {
        let store = SessionStore::in_memory();
        store.logout();
        assert_eq!(store.snapshot(), Session::default());

        store.set_login_response("abc", summary_user());
        store.logout();
        store.logout();
        assert_eq!(store.snapshot(), Session::default());
    }

    #[test]
    fn test_mutations_are_persisted() {
        let storage = Arc::new(MemoryStateStorage::new());
        let store = SessionStore::load(storage.clone());

        store.set_login_response("abc", summary_user());
        let persisted: Session = storage.load(SESSION_KEY).unwrap().unwrap();
        assert_eq!(persisted, store.snapshot());

        store.set_token("broken").unwrap_err();
        let persisted: Session = storage.load(SESSION_KEY).unwrap().unwrap();
        assert_eq!(persisted, Session::default());
    }

    #[test]
    fn test_rehydrates_from_file() {
        let temp = TempDir::new().unwrap();
        let token = valid_token();

        {
            let storage = Arc::new(FileStateStorage::new(temp.path()).unwrap());
            SessionStore::load(storage).set_token(token.clone()).unwrap();
        }

        let storage = Arc::new(FileStateStorage::new(temp.path()).unwrap());
        let store = SessionStore::load(storage);
        assert_eq!(store.token(), token);
        assert_eq!(store.user_tier(), Tier::Basic);
    }

    #[test]
    fn test_inconsistent_record_is_discarded() {
        let storage = Arc::new(MemoryStateStorage::new());
        storage
            .save_raw(SESSION_KEY, r#"{"token":"abc","user":null}"#)
            .unwrap();
        assert!(!SessionStore::load(storage.clone()).is_logged_in());

        storage.save_raw(SESSION_KEY, "not json").unwrap();
        assert_eq!(SessionStore::load(storage).snapshot(), Session::default());
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::in_memory();
        let other = store.clone();

        store.set_login_response("abc", summary_user());
        assert!(other.is_logged_in());
    }

    #[test]
    fn test_debug_redacts_token() {
        let store = SessionStore::in_memory();
        store.set_login_response("very-secret", summary_user());
        assert!(!format!("{:?}", store).contains("very-secret"));
    }

    #[tokio::test]
    async fn test_fetch_user_profile_replaces_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/profile"))
            .and(header("Authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": {
                    "id": 1,
                    "email": "a@b.com",
                    "username": "reader",
                    "avatar": "https://cdn.example.com/a.png",
                    "tier": "premium"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = SessionStore::in_memory();
        store.set_login_response("abc", summary_user());
        let auth = auth_for(&server.uri(), &store);

        let user = store.fetch_user_profile(&auth).await.unwrap();

        assert_eq!(user.username.as_deref(), Some("reader"));
        assert_eq!(store.token(), "abc");
        assert_eq!(store.user_tier(), Tier::Premium);
    }

    #[tokio::test]
    async fn test_fetch_user_profile_network_failure_keeps_session() {
        let store = SessionStore::in_memory();
        store.set_login_response("abc", summary_user());
        let auth = auth_for("http://127.0.0.1:9", &store);

        assert!(store.fetch_user_profile(&auth).await.is_none());

        assert!(store.is_logged_in());
        assert_eq!(store.token(), "abc");
        assert_eq!(store.user(), Some(summary_user()));
    }

    #[tokio::test]
    async fn test_fetch_user_profile_server_error_keeps_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/profile"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = SessionStore::in_memory();
        store.set_login_response("abc", summary_user());
        let auth = auth_for(&server.uri(), &store);

        assert!(store.fetch_user_profile(&auth).await.is_none());
        assert_eq!(store.user(), Some(summary_user()));
    }

    #[tokio::test]
    async fn test_profile_after_logout_is_discarded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/profile"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"user": {"id": 1, "email": "a@b.com", "tier": "basic"}}))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let store = SessionStore::in_memory();
        store.set_login_response("abc", summary_user());
        let auth = auth_for(&server.uri(), &store);

        let (refreshed, ()) = tokio::join!(store.fetch_user_profile(&auth), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            store.logout();
        });

        assert!(refreshed.is_none());
        assert_eq!(store.snapshot(), Session::default());
    }
}
