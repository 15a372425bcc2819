//! The shared HTTP client, built on `reqwest`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use foodgully_protocol::{Codec, JsonCodec};
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, Request, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::{RequestInterceptor, TokenSource, TransportError};

/// Counter for tagging requests in logs.
static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// BearerAuth
// ---------------------------------------------------------------------------

/// Sets `Authorization: Bearer <token>` when the [`TokenSource`] has one.
///
/// With no token the header is left off entirely. A request that already
/// carries an `Authorization` header was given an explicit credential by
/// its caller (the `/jwt` exchange presents the identity provider's token)
/// and is not touched.
pub struct BearerAuth<S> {
    source: S,
}

impl<S: TokenSource> BearerAuth<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

impl<S: TokenSource> RequestInterceptor for BearerAuth<S> {
    fn name(&self) -> &'static str {
        "bearer-auth"
    }

    fn intercept(&self, request: &mut Request) -> Result<(), TransportError> {
        if request.headers().contains_key(AUTHORIZATION) {
            return Ok(());
        }
        let Some(token) = self.source.token() else {
            return Ok(());
        };
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| TransportError::Interceptor {
                name: self.name(),
                reason: e.to_string(),
            })?;
        value.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, value);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// HttpClient
// ---------------------------------------------------------------------------

struct Inner {
    http: reqwest::Client,
    base_url: Url,
    interceptors: Vec<Box<dyn RequestInterceptor>>,
    codec: JsonCodec,
}

/// The one request pipeline every backend call flows through.
///
/// Built once, then shared: cloning is an `Arc` bump, so every clone has the
/// same base URL, the same connection pool, and the same interceptors. Don't
/// build a new client per call.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<Inner>,
}

impl HttpClient {
    /// Starts a builder for a client rooted at `base_url`.
    pub fn builder(base_url: &str) -> HttpClientBuilder {
        HttpClientBuilder::new(base_url)
    }

    /// The base endpoint all paths are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Resolves `path` against the base URL.
    ///
    /// Leading slashes are ignored so `/foods` and `foods` both land under
    /// the base path, even when the base has a path of its own.
    ///
    /// # Errors
    /// [`TransportError::OutsideBase`] if the result leaves the base
    /// endpoint, e.g. an absolute URL or `../` climbing above the base path.
    pub fn url(&self, path: &str) -> Result<Url, TransportError> {
        let base = &self.inner.base_url;
        let url = base.join(path.trim_start_matches('/'))?;
        if url.origin() != base.origin() || !url.path().starts_with(base.path()) {
            tracing::warn!(%url, "refusing request outside the api base url");
            return Err(TransportError::OutsideBase(url.to_string()));
        }
        Ok(url)
    }

    /// Builds a body-less request and runs it through the interceptors
    /// without sending it.
    pub fn prepare(
        &self,
        method: Method,
        path: &str,
    ) -> Result<Request, TransportError> {
        self.build(method, path, |b| b)
    }

    /// `GET path`, decoding a JSON response.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, TransportError> {
        let request = self.build(Method::GET, path, |b| b)?;
        self.execute_json(request).await
    }

    /// `GET path?query`, decoding a JSON response.
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, TransportError> {
        let request = self.build(Method::GET, path, |b| b.query(query))?;
        self.execute_json(request).await
    }

    /// `POST path` with a JSON body.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.build(Method::POST, path, |b| b.json(body))?;
        self.execute_json(request).await
    }

    /// `PATCH path` with a JSON body.
    pub async fn patch_json<B, T>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.build(Method::PATCH, path, |b| b.json(body))?;
        self.execute_json(request).await
    }

    /// `DELETE path`, decoding a JSON response.
    pub async fn delete_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, TransportError> {
        let request = self.build(Method::DELETE, path, |b| b)?;
        self.execute_json(request).await
    }

    /// `POST path` with an empty body and an explicit bearer credential.
    ///
    /// The explicit header wins over [`BearerAuth`], so this is how a
    /// credential other than the stored token is presented.
    pub async fn post_empty_with_bearer<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: &str,
    ) -> Result<T, TransportError> {
        let request =
            self.build(Method::POST, path, |b| b.bearer_auth(bearer))?;
        self.execute_json(request).await
    }

    fn build(
        &self,
        method: Method,
        path: &str,
        configure: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<Request, TransportError> {
        let url = self.url(path)?;
        let mut request =
            configure(self.inner.http.request(method, url)).build()?;
        for interceptor in &self.inner.interceptors {
            interceptor.intercept(&mut request)?;
        }
        Ok(request)
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: Request,
    ) -> Result<T, TransportError> {
        let id = NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed);
        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(id, %method, %url, "sending request");

        let response = self.inner.http.execute(request).await.map_err(|e| {
            tracing::debug!(id, error = %e, "request failed");
            TransportError::Request(e)
        })?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            tracing::debug!(id, status = status.as_u16(), "non-success status");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        tracing::trace!(id, bytes = body.len(), "response received");
        Ok(self.inner.codec.decode(&body)?)
    }
}

/// Builds `collection/<id>` with `id` percent-encoded as one path segment.
///
/// `/`, `?`, `#` and `%` inside the id are escaped, so an id can neither
/// add segments nor cut the path short.
///
/// ```rust
/// use foodgully_transport::resource_path;
///
/// assert_eq!(resource_path("/foods", "f1").unwrap(), "/foods/f1");
/// assert_eq!(resource_path("/foods", "a/b?c").unwrap(), "/foods/a%2Fb%3Fc");
/// ```
///
/// # Errors
/// [`TransportError::InvalidSegment`] for an empty id, `.` or `..`.
pub fn resource_path(collection: &str, id: &str) -> Result<String, TransportError> {
    if matches!(id, "" | "." | "..") {
        return Err(TransportError::InvalidSegment(id.to_string()));
    }
    let mut scratch = Url::parse("http://localhost/")?;
    scratch
        .path_segments_mut()
        .map_err(|()| TransportError::InvalidSegment(id.to_string()))?
        .clear()
        .extend(collection.split('/').filter(|s| !s.is_empty()))
        .push(id);
    Ok(scratch.path().to_string())
}

// ---------------------------------------------------------------------------
// HttpClientBuilder
// ---------------------------------------------------------------------------

/// Builder for the shared [`HttpClient`].
///
/// # Example
///
/// ```rust
/// use foodgully_transport::{HttpClient, TokenSource};
///
/// struct NoToken;
/// impl TokenSource for NoToken {
///     fn token(&self) -> Option<String> {
///         None
///     }
/// }
///
/// let client = HttpClient::builder("https://food-gully-server.vercel.app")
///     .bearer_auth(NoToken)
///     .build()
///     .unwrap();
/// assert_eq!(
///     client.url("/foods").unwrap().as_str(),
///     "https://food-gully-server.vercel.app/foods"
/// );
/// ```
pub struct HttpClientBuilder {
    base_url: String,
    timeout: Duration,
    user_agent: Option<String>,
    interceptors: Vec<Box<dyn RequestInterceptor>>,
}

impl HttpClientBuilder {
    fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            interceptors: Vec::new(),
        }
    }

    /// Per-request timeout. Default: 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_string());
        self
    }

    /// Appends an interceptor. They run in the order they were added.
    pub fn interceptor(mut self, interceptor: impl RequestInterceptor) -> Self {
        self.interceptors.push(Box::new(interceptor));
        self
    }

    /// Shorthand for `.interceptor(BearerAuth::new(source))`.
    pub fn bearer_auth(self, source: impl TokenSource) -> Self {
        self.interceptor(BearerAuth::new(source))
    }

    /// Builds the client.
    ///
    /// # Errors
    /// - [`TransportError::InvalidUrl`] if the base URL doesn't parse
    /// - [`TransportError::Request`] if the TLS backend can't initialize
    pub fn build(self) -> Result<HttpClient, TransportError> {
        let mut base_url = Url::parse(&self.base_url)?;
        // `Url::join` replaces the last path segment unless the base ends
        // with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut http = reqwest::Client::builder().timeout(self.timeout);
        if let Some(agent) = &self.user_agent {
            http = http.user_agent(agent.as_str());
        }

        tracing::debug!(%base_url, interceptors = self.interceptors.len(), "http client built");
        Ok(HttpClient {
            inner: Arc::new(Inner {
                http: http.build()?,
                base_url,
                interceptors: self.interceptors,
                codec: JsonCodec,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// A token source the test can change between requests.
    #[derive(Clone, Default)]
    struct SharedToken(Arc<Mutex<Option<String>>>);

    impl SharedToken {
        fn set(&self, token: Option<&str>) {
            *self.0.lock().unwrap() = token.map(str::to_string);
        }
    }

    impl TokenSource for SharedToken {
        fn token(&self) -> Option<String> {
            self.0.lock().unwrap().clone()
        }
    }

    fn client_with(source: SharedToken) -> HttpClient {
        HttpClient::builder("https://api.example.com")
            .bearer_auth(source)
            .build()
            .expect("client should build")
    }

    fn auth_header(request: &Request) -> Option<&str> {
        request
            .headers()
            .get(AUTHORIZATION)
            .map(|v| v.to_str().unwrap())
    }

    #[test]
    fn test_prepare_with_token_sets_bearer_header() {
        let source = SharedToken::default();
        source.set(Some("abc123"));
        let client = client_with(source);

        let request = client.prepare(Method::GET, "/foods").unwrap();

        assert_eq!(auth_header(&request), Some("Bearer abc123"));
    }

    #[test]
    fn test_prepare_without_token_omits_header() {
        let client = client_with(SharedToken::default());

        let request = client.prepare(Method::GET, "/foods").unwrap();

        assert_eq!(auth_header(&request), None);
    }

    #[test]
    fn test_prepare_reads_token_per_request() {
        // The same client must follow token rotation and removal.
        let source = SharedToken::default();
        let client = client_with(source.clone());

        source.set(Some("old"));
        let first = client.prepare(Method::GET, "/a").unwrap();
        source.set(Some("new"));
        let second = client.prepare(Method::GET, "/b").unwrap();
        source.set(None);
        let third = client.prepare(Method::GET, "/c").unwrap();

        assert_eq!(auth_header(&first), Some("Bearer old"));
        assert_eq!(auth_header(&second), Some("Bearer new"));
        assert_eq!(auth_header(&third), None);
    }

    #[test]
    fn test_bearer_auth_keeps_explicit_authorization() {
        let source = SharedToken::default();
        source.set(Some("stored"));
        let client = client_with(source);

        let request = client
            .build(Method::POST, "/jwt", |b| b.bearer_auth("provider"))
            .unwrap();

        assert_eq!(auth_header(&request), Some("Bearer provider"));
    }

    #[test]
    fn test_bearer_auth_invalid_token_rejects_request() {
        let source = SharedToken::default();
        source.set(Some("bad\ntoken"));
        let client = client_with(source);

        let result = client.prepare(Method::GET, "/foods");

        assert!(matches!(
            result,
            Err(TransportError::Interceptor { name: "bearer-auth", .. })
        ));
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = HttpClient::builder("https://api.example.com/v1")
            .build()
            .unwrap();

        assert_eq!(
            client.url("/foods/7").unwrap().as_str(),
            "https://api.example.com/v1/foods/7"
        );
    }

    #[test]
    fn test_prepare_absolute_foreign_url_is_rejected() {
        let source = SharedToken::default();
        source.set(Some("secret"));
        let client = client_with(source);

        for path in [
            "https://attacker.example/steal",
            "http://api.example.com/foods",
            "https://api.example.com:8443/foods",
        ] {
            let result = client.prepare(Method::GET, path);
            assert!(
                matches!(result, Err(TransportError::OutsideBase(_))),
                "{path} should be refused"
            );
        }
    }

    #[test]
    fn test_url_scheme_relative_path_stays_on_base_host() {
        let client = client_with(SharedToken::default());

        let url = client.url("//attacker.example/steal").unwrap();

        assert_eq!(url.host_str(), Some("api.example.com"));
    }

    #[test]
    fn test_url_dot_segments_above_base_path_are_rejected() {
        let client = HttpClient::builder("https://api.example.com/v1")
            .build()
            .unwrap();

        assert!(matches!(
            client.url("../admin"),
            Err(TransportError::OutsideBase(_))
        ));
        assert!(matches!(
            client.url("/foods/../../admin"),
            Err(TransportError::OutsideBase(_))
        ));
        assert_eq!(
            client.url("/foods/../my-requests").unwrap().as_str(),
            "https://api.example.com/v1/my-requests"
        );
    }

    #[test]
    fn test_resource_path_encodes_separators_in_id() {
        assert_eq!(resource_path("/foods", "abc").unwrap(), "/foods/abc");
        assert_eq!(
            resource_path("/foods", "../my-requests/x").unwrap(),
            "/foods/..%2Fmy-requests%2Fx"
        );
        assert_eq!(
            resource_path("/my-requests", "a?b#c%").unwrap(),
            "/my-requests/a%3Fb%23c%25"
        );
    }

    #[test]
    fn test_resource_path_dot_ids_are_rejected() {
        for id in ["", ".", ".."] {
            assert!(matches!(
                resource_path("/foods", id),
                Err(TransportError::InvalidSegment(_))
            ));
        }
    }

    #[test]
    fn test_resource_path_stays_under_base() {
        let client = HttpClient::builder("https://api.example.com/v1")
            .build()
            .unwrap();

        let path = resource_path("/foods", "../../admin").unwrap();
        let url = client.url(&path).unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/foods/..%2F..%2Fadmin"
        );
    }

    #[test]
    fn test_build_invalid_base_url_returns_error() {
        let result = HttpClient::builder("not a url").build();
        assert!(matches!(result, Err(TransportError::InvalidUrl(_))));
    }

    #[test]
    fn test_clones_share_one_pipeline() {
        let client = client_with(SharedToken::default());
        let clone = client.clone();
        assert!(Arc::ptr_eq(&client.inner, &clone.inner));
    }
}
