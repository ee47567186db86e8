//! HTTP client for the rating platform's REST API.
//!
//! Every request reads the bearer token from the auth store's durable token
//! key just before it is sent. Every 401 is reported to the client's
//! [`UnauthorizedHandler`], chosen per route group when the client is built.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::ApiError;
use crate::auth::AuthStore;
use crate::config::Config;
use crate::routes::{Navigator, Route};

// ============================================================================
// Constants
// ============================================================================

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

// ============================================================================
// Unauthorized handling
// ============================================================================

/// Reaction to a 401 from any request made through a client.
pub trait UnauthorizedHandler: Send + Sync {
    fn on_unauthorized(&self);
}

/// For public auth pages: a 401 is just a failed login, shown inline.
pub struct IgnoreUnauthorized;

impl UnauthorizedHandler for IgnoreUnauthorized {
    fn on_unauthorized(&self) {
        debug!("401 on public client, leaving session untouched");
    }
}

/// Log out and hard-navigate to `/login`, unless the user is already on
/// `/login` or `/signup`.
pub struct LogoutRedirect {
    store: Arc<AuthStore>,
    navigator: Arc<dyn Navigator>,
}

impl LogoutRedirect {
    pub fn new(store: Arc<AuthStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }
}

impl UnauthorizedHandler for LogoutRedirect {
    fn on_unauthorized(&self) {
        let current = self.navigator.current_route();
        if current.is_public_auth() {
            debug!(route = %current, "401 on auth page, not redirecting");
            return;
        }
        warn!(route = %current, "Session rejected by server, logging out");
        self.store.logout();
        self.navigator.navigate(Route::Login);
    }
}

// ============================================================================
// Client
// ============================================================================

/// API client. Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
    store: Option<Arc<AuthStore>>,
    on_unauthorized: Arc<dyn UnauthorizedHandler>,
}

impl ApiClient {
    /// Create an anonymous client for `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            store: None,
            on_unauthorized: Arc::new(IgnoreUnauthorized),
        })
    }

    /// Client for public pages: no credentials, 401s are not acted on.
    pub fn public(config: &Config) -> Result<Self> {
        Self::new(&config.api_url(), config.request_timeout())
    }

    /// Client that sends the stored bearer token and reacts to 401 with `handler`.
    pub fn authorized(
        config: &Config,
        store: Arc<AuthStore>,
        handler: Arc<dyn UnauthorizedHandler>,
    ) -> Result<Self> {
        Ok(Self::public(config)?.with_store(store).with_handler(handler))
    }

    /// Same connection pool, reading credentials from `store`.
    pub fn with_store(&self, store: Arc<AuthStore>) -> Self {
        Self {
            store: Some(store),
            ..self.clone()
        }
    }

    /// Same connection pool, different 401 reaction.
    pub fn with_handler(&self, handler: Arc<dyn UnauthorizedHandler>) -> Self {
        Self {
            on_unauthorized: handler,
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> Option<&Arc<AuthStore>> {
        self.store.as_ref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.store.as_ref().and_then(|s| s.token()) {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))
                    .context("Stored token is not a valid header value")?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        &self,
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        let status = response.status();
        if status.is_success() {
            return Ok(Some(response));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(None);
        }
        if status == StatusCode::UNAUTHORIZED {
            self.on_unauthorized.on_unauthorized();
            return Err(ApiError::Unauthorized.into());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body).into())
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<reqwest::Response> {
        let url = self.url(path);
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let mut request = self
                .client
                .request(method.clone(), &url)
                .headers(self.auth_headers()?);
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request
                .send()
                .await
                .map_err(ApiError::from)
                .with_context(|| format!("Failed to send {} request to {}", method, url))?;

            match self.check_response_for_retry(response).await? {
                Some(response) => return Ok(response),
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = %url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response, path: &str) -> Result<T> {
        let text = response
            .text()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to read response body from {}", path))?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)).into())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_with_query(path, &[]).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self.send::<()>(Method::GET, path, query, None).await?;
        Self::parse(response, path).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.send(Method::POST, path, &[], Some(body)).await?;
        Self::parse(response, path).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.send(Method::PATCH, path, &[], Some(body)).await?;
        Self::parse(response, path).await
    }

    /// PATCH where the response body is not needed.
    pub async fn patch_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        self.send(Method::PATCH, path, &[], Some(body)).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send::<()>(Method::DELETE, path, &[], None).await?;
        Ok(())
    }

    pub async fn delete_with_body<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        self.send(Method::DELETE, path, &[], Some(body)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStorage;
    use crate::models::{User, UserRole};
    use crate::routes::MemoryNavigator;

    fn logged_in_store() -> Arc<AuthStore> {
        let store = AuthStore::new(Arc::new(MemoryStorage::new()));
        store.rehydrate();
        store.set_auth(
            User {
                id: "u1".into(),
                email: "u1@uni.edu".into(),
                name: "U1".into(),
                role: UserRole::Student,
                is_email_verified: Some(true),
                created_at: None,
                updated_at: None,
            },
            "tok1".into(),
        );
        store
    }

    #[test]
    fn test_logout_redirect_on_protected_route() {
        let store = logged_in_store();
        let nav = Arc::new(MemoryNavigator::new(Route::Professors));
        let handler = LogoutRedirect::new(store.clone(), nav.clone());

        handler.on_unauthorized();
        assert_eq!(store.token(), None);
        assert!(!store.is_authenticated());
        assert_eq!(nav.current_route(), Route::Login);
    }

    #[test]
    fn test_logout_redirect_skipped_on_auth_pages() {
        for route in [Route::Login, Route::Signup] {
            let store = logged_in_store();
            let nav = Arc::new(MemoryNavigator::new(route.clone()));
            let handler = LogoutRedirect::new(store.clone(), nav.clone());

            handler.on_unauthorized();
            assert_eq!(store.token().as_deref(), Some("tok1"));
            assert!(nav.history().is_empty(), "redirected from {}", route);
        }
    }

    #[test]
    fn test_auth_headers_follow_token_key() {
        let store = logged_in_store();
        let client = ApiClient::new("http://localhost:3000/api/", Duration::from_secs(1))
            .unwrap()
            .with_store(store.clone());
        assert_eq!(client.base_url(), "http://localhost:3000/api");

        let headers = client.auth_headers().unwrap();
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer tok1");

        store.logout();
        assert!(client.auth_headers().unwrap().get(header::AUTHORIZATION).is_none());
    }
}
