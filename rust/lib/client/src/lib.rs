//! Remote Resource Client for the inventory admin API.
//!
//! One typed call per verb/endpoint pair of an entity, no business logic
//! and no retries beyond what the transport does. Authentication is
//! handled by pluggable [`TokenSource`] implementations.
//!
//! # Usage
//!
//! ```ignore
//! use netadmin_client::{ResourceApi, ResourceClient, StaticToken};
//!
//! let client = ResourceClient::<Ont>::new("http://localhost:8080/api", Arc::new(StaticToken::new(jwt)));
//! let onts = client.list(&ListParams::default()).await?;
//! ```
//!
//! Callers must not assume a failed `create` is safe to resend: the
//! backend may have stored the record before the connection dropped.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use netadmin_core::{AdminConfig, ApiResponse, ErrorBody, ListParams, Resource};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

// ── Error ───────────────────────────────────────────────────────────

/// Client-side API error.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("auth: {0}")]
    Auth(String),

    #[error("decode: {0}")]
    Decode(String),

    #[error("invalid id {0:?}")]
    InvalidId(String),
}

/// Extract a readable message from an error response body.
///
/// Uses `message` from a `{code, message}` body when present, the raw
/// text otherwise.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => err.message,
        Err(_) => body.trim().to_string(),
    }
}

/// Build the shared HTTP client honoring the configured timeout.
pub fn http_client(config: &AdminConfig) -> Result<reqwest::Client, ApiError> {
    Ok(reqwest::Client::builder().timeout(config.timeout()).build()?)
}

async fn server_error(resp: reqwest::Response) -> ApiError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    ApiError::Server {
        status,
        message: error_message(&body),
    }
}

// ── TokenSource ─────────────────────────────────────────────────────

/// Pluggable token provider. Called before every API request.
///
/// Returns `Ok(None)` to skip the Authorization header (anonymous).
#[async_trait]
pub trait TokenSource: Send + Sync + 'static {
    async fn token(&self) -> Result<Option<String>, ApiError>;
}

/// No authentication: anonymous requests.
pub struct NoAuth;

#[async_trait]
impl TokenSource for NoAuth {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(None)
    }
}

/// Static bearer token (already obtained, e.g. stored by `netadmin login`).
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(Some(self.0.clone()))
    }
}

/// Token issued by `POST {base}/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub token: String,
    /// Lifetime in seconds. Absent means the backend did not say.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

/// Lifetime assumed when the login response carries none.
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Password-based login. Authenticates lazily on first use, caches the
/// token and logs in again once it expires.
pub struct PasswordLogin {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    cached: tokio::sync::RwLock<Option<CachedToken>>,
}

struct CachedToken {
    token: String,
    /// Absolute expiry timestamp (seconds since epoch).
    expires_at: i64,
}

impl CachedToken {
    fn valid_now(&self) -> Option<String> {
        (chrono::Utc::now().timestamp() < self.expires_at).then(|| self.token.clone())
    }
}

impl PasswordLogin {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
            cached: tokio::sync::RwLock::new(None),
        }
    }

    /// Perform the login call and return the issued token.
    pub async fn login(&self) -> Result<LoginData, ApiError> {
        let url = format!("{}/auth/login", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&serde_json::json!({
                "username": self.username,
                "password": self.password,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Auth(format!(
                "login failed ({}): {}",
                status,
                error_message(&body)
            )));
        }

        let envelope: ApiResponse<LoginData> = resp
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("login response: {}", e)))?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl TokenSource for PasswordLogin {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        {
            let guard = self.cached.read().await;
            if let Some(token) = guard.as_ref().and_then(CachedToken::valid_now) {
                return Ok(Some(token));
            }
        }

        let mut guard = self.cached.write().await;
        // Another task may have logged in while we waited for the lock.
        if let Some(token) = guard.as_ref().and_then(CachedToken::valid_now) {
            return Ok(Some(token));
        }

        let data = self.login().await?;
        let ttl = data
            .expires_in
            .and_then(|s| i64::try_from(s).ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        // Expire 30s early to avoid edge-case races.
        let expires_at = chrono::Utc::now().timestamp() + ttl - 30;
        debug!(user = %self.username, "login succeeded");
        *guard = Some(CachedToken {
            token: data.token.clone(),
            expires_at,
        });
        Ok(Some(data.token))
    }
}

// ── ResourceApi ─────────────────────────────────────────────────────

/// CRUD surface of one entity collection.
///
/// [`ResourceClient`] is the HTTP implementation; tests substitute
/// in-memory fakes at this seam.
#[async_trait]
pub trait ResourceApi<T: Resource>: Send + Sync + 'static {
    async fn list(&self, params: &ListParams) -> Result<ApiResponse<Vec<T>>, ApiError>;

    async fn get(&self, id: &str) -> Result<ApiResponse<T>, ApiError>;

    /// Create a record. Not idempotent.
    async fn create(&self, body: &Value) -> Result<ApiResponse<T>, ApiError>;

    async fn update(&self, id: &str, body: &Value) -> Result<ApiResponse<T>, ApiError>;

    async fn delete(&self, id: &str) -> Result<ApiResponse<Value>, ApiError>;
}

// ── ResourceClient ──────────────────────────────────────────────────

/// HTTP client for a single entity.
///
/// Endpoints, relative to the configured base API endpoint:
///
/// | call | request |
/// |---|---|
/// | list | `GET {base}/{PATH}?locationId=..` |
/// | get | `GET {base}/{PATH}/{id}` |
/// | create | `POST {base}/{PATH}` |
/// | update | `PUT {base}/{PATH}/{id}` |
/// | delete | `DELETE {base}/{PATH}/{id}` |
pub struct ResourceClient<T: Resource> {
    http: reqwest::Client,
    base_url: String,
    token_source: Arc<dyn TokenSource>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Resource> ResourceClient<T> {
    pub fn new(base_url: impl Into<String>, token_source: Arc<dyn TokenSource>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, token_source)
    }

    /// Share an existing `reqwest::Client` (connection pool, timeout).
    pub fn with_http(
        http: reqwest::Client,
        base_url: impl Into<String>,
        token_source: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token_source,
            _phantom: PhantomData,
        }
    }

    pub fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, T::PATH)
    }

    /// URL of record `id`, with `id` escaped as a single path segment.
    ///
    /// Empty and dot-segment ids have no item URL.
    pub fn item_url(&self, id: &str) -> Result<String, ApiError> {
        if matches!(id, "" | "." | "..") {
            return Err(ApiError::InvalidId(id.to_string()));
        }
        let collection = self.collection_url();
        let mut url = reqwest::Url::parse(&collection)
            .map_err(|e| ApiError::InvalidId(format!("{} under {}: {}", id, collection, e)))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidId(format!("{} under {}", id, collection)))?
            .push(id);
        Ok(url.into())
    }

    async fn authed(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        match self.token_source.token().await? {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Ok(builder),
        }
    }

    async fn send<R: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<ApiResponse<R>, ApiError> {
        let resp = self.authed(builder).await?.send().await?;
        if !resp.status().is_success() {
            return Err(server_error(resp).await);
        }
        resp.json::<ApiResponse<R>>()
            .await
            .map_err(|e| ApiError::Decode(format!("{} response: {}", T::NAME, e)))
    }
}

#[async_trait]
impl<T: Resource> ResourceApi<T> for ResourceClient<T> {
    async fn list(&self, params: &ListParams) -> Result<ApiResponse<Vec<T>>, ApiError> {
        debug!(resource = T::NAME, ?params, "list");
        let req = self.http.get(self.collection_url()).query(&params.query_pairs());
        self.send(req).await
    }

    async fn get(&self, id: &str) -> Result<ApiResponse<T>, ApiError> {
        debug!(resource = T::NAME, id, "get");
        self.send(self.http.get(self.item_url(id)?)).await
    }

    async fn create(&self, body: &Value) -> Result<ApiResponse<T>, ApiError> {
        debug!(resource = T::NAME, "create");
        self.send(self.http.post(self.collection_url()).json(body)).await
    }

    async fn update(&self, id: &str, body: &Value) -> Result<ApiResponse<T>, ApiError> {
        debug!(resource = T::NAME, id, "update");
        self.send(self.http.put(self.item_url(id)?).json(body)).await
    }

    async fn delete(&self, id: &str) -> Result<ApiResponse<Value>, ApiError> {
        debug!(resource = T::NAME, id, "delete");
        self.send(self.http.delete(self.item_url(id)?)).await
    }
}

// ── AuthClient ──────────────────────────────────────────────────────

/// Session endpoints outside any entity collection.
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    token_source: Arc<dyn TokenSource>,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>, token_source: Arc<dyn TokenSource>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token_source,
        }
    }

    /// `POST {base}/auth/check`: verify the current token is accepted.
    pub async fn check(&self) -> Result<ApiResponse<Value>, ApiError> {
        let mut req = self.http.post(format!("{}/auth/check", self.base_url));
        if let Some(token) = self.token_source.token().await? {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(server_error(resp).await);
        }
        resp.json()
            .await
            .map_err(|e| ApiError::Decode(format!("check response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Widget {
        id: Option<String>,
    }

    impl Resource for Widget {
        const NAME: &'static str = "widget";
        const PATH: &'static str = "widgets";
        const LABEL: &'static str = "Widget";
        fn id(&self) -> Option<&str> {
            self.id.as_deref()
        }
    }

    #[tokio::test]
    async fn no_auth_returns_none() {
        assert!(NoAuth.token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn static_token_returns_value() {
        let ts = StaticToken::new("my-jwt-token");
        assert_eq!(ts.token().await.unwrap(), Some("my-jwt-token".to_string()));
    }

    #[test]
    fn urls_trim_trailing_slash() {
        let client = ResourceClient::<Widget>::new("http://host/api/", Arc::new(NoAuth));
        assert_eq!(client.collection_url(), "http://host/api/widgets");
        assert_eq!(client.item_url("7").unwrap(), "http://host/api/widgets/7");
    }

    #[test]
    fn item_url_escapes_id_as_one_segment() {
        let client = ResourceClient::<Widget>::new("http://host/api", Arc::new(NoAuth));
        assert_eq!(client.item_url("a/b?c").unwrap(), "http://host/api/widgets/a%2Fb%3Fc");
        assert_eq!(client.item_url("ONT 7#2").unwrap(), "http://host/api/widgets/ONT%207%232");
        assert_eq!(client.item_url("uuid-1").unwrap(), "http://host/api/widgets/uuid-1");
        for bad in ["", ".", ".."] {
            assert!(matches!(client.item_url(bad), Err(ApiError::InvalidId(_))), "{:?}", bad);
        }
    }

    #[test]
    fn error_message_prefers_structured_body() {
        assert_eq!(
            error_message(r#"{"code":"NOT_FOUND","message":"ont '7' not found"}"#),
            "ont '7' not found"
        );
        assert_eq!(error_message("  upstream timeout \n"), "upstream timeout");
    }

    #[test]
    fn login_data_accepts_missing_expiry() {
        let env: ApiResponse<LoginData> =
            serde_json::from_str(r#"{"data":{"token":"abc"}}"#).unwrap();
        assert_eq!(env.data.token, "abc");
        assert!(env.data.expires_in.is_none());
    }

    #[test]
    fn cached_token_expiry() {
        let live = CachedToken {
            token: "t".into(),
            expires_at: chrono::Utc::now().timestamp() + 60,
        };
        let dead = CachedToken {
            token: "t".into(),
            expires_at: chrono::Utc::now().timestamp() - 1,
        };
        assert_eq!(live.valid_now().as_deref(), Some("t"));
        assert!(dead.valid_now().is_none());
    }
}
