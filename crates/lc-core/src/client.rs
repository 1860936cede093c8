use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::errors::{ApiError, Result};
use crate::hooks::{BearerAuth, RequestHook, TokenSource};

/// Longest slice of an unstructured error body kept in [`ApiError::Http`]
const ERROR_SNIPPET_LEN: usize = 200;

/// HTTP client for the content API.
///
/// Every request is passed through the registered [`RequestHook`]s before it
/// is dispatched. The client never retries and never reacts to 401/403.
#[derive(Clone)]
pub struct ApiClient {
    config: ClientConfig,
    http: Client,
    hooks: Vec<Arc<dyn RequestHook>>,
}

impl ApiClient {
    /// Create a new client without hooks
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(config.http_timeouts.connect)
            .timeout(config.http_timeouts.request)
            .user_agent(config.user_agent.as_deref().unwrap_or("lectern"))
            .build()?;

        Ok(Self {
            config,
            http,
            hooks: Vec::new(),
        })
    }

    /// Append a pre-request hook
    pub fn with_hook(mut self, hook: impl RequestHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Append the bearer-token hook reading from `source`
    pub fn with_bearer_auth(self, source: Arc<dyn TokenSource>) -> Self {
        self.with_hook(BearerAuth::new(source))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET `path` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let builder = self.http.request(Method::GET, self.url(path)?);
        self.execute(builder).await
    }

    /// GET `path` with `query` serialized as query parameters
    pub async fn get_json_with_query<Q, T>(&self, path: &str, query: &Q) -> Result<T>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.http.request(Method::GET, self.url(path)?).query(query);
        self.execute(builder).await
    }

    /// GET a single resource `{collection}/{id}`, with `id` percent-encoded.
    ///
    /// A 404 becomes [`ApiError::NotFound`].
    pub async fn get_json_item<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<T> {
        let mut url = self.url(collection)?;
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id);
        }

        let path = url.path().to_string();
        let builder = self.http.request(Method::GET, url);
        self.execute(builder).await.map_err(|e| match e {
            ApiError::Http { status, .. } if status == StatusCode::NOT_FOUND => {
                ApiError::NotFound { path }
            }
            other => other,
        })
    }

    /// POST `body` as JSON to `path` and decode the JSON response
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.http.request(Method::POST, self.url(path)?).json(body);
        self.execute(builder).await
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&self.config.endpoint(path))?)
    }

    #[instrument(skip(self, builder))]
    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let mut request = builder.build()?;
        for hook in &self.hooks {
            hook.before_send(&mut request);
        }

        debug!("{} {}", request.method(), request.url());
        let response = self.http.execute(request).await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

async fn error_from_response(response: Response) -> ApiError {
    let status = response.status();
    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

    warn!("Request to {} failed with {}: {}", url.path(), status, message);
    ApiError::Http { status, message }
}

/// Prefer the backend's `message`/`error` field, else a snippet of the body
fn error_message(body: &str) -> Option<String> {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        error: Option<String>,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body)
        && let Some(message) = parsed.message.or(parsed.error)
    {
        return Some(message);
    }

    let snippet: String = body.trim().chars().take(ERROR_SNIPPET_LEN).collect();
    (!snippet.is_empty()).then_some(snippet)
}
