//! Exchanging a provider identity token for an application bearer token.

use std::future::Future;

use foodgully_protocol::JwtResponse;
use foodgully_transport::HttpClient;

use crate::SessionError;

/// Path of the backend's token-issuance endpoint.
pub const DEFAULT_EXCHANGE_PATH: &str = "/jwt";

/// Trades a provider identity token for an application token.
pub trait TokenExchange: Send + Sync + 'static {
    /// # Errors
    /// [`SessionError::TokenExchange`] for any failure: network, a
    /// non-2xx status, or a body without a usable `token`.
    fn exchange(
        &self,
        provider_token: &str,
    ) -> impl Future<Output = Result<String, SessionError>> + Send;
}

/// `POST /jwt` with `Authorization: Bearer <provider token>` and an empty
/// body; the response is `{ "token": "..." }`.
///
/// Goes through the shared [`HttpClient`]. The explicit provider
/// credential takes precedence over any stored application token.
#[derive(Clone)]
pub struct BackendExchange {
    client: HttpClient,
    path: String,
}

impl BackendExchange {
    pub fn new(client: HttpClient) -> Self {
        Self::with_path(client, DEFAULT_EXCHANGE_PATH)
    }

    pub fn with_path(client: HttpClient, path: &str) -> Self {
        Self {
            client,
            path: path.to_string(),
        }
    }
}

impl TokenExchange for BackendExchange {
    async fn exchange(&self, provider_token: &str) -> Result<String, SessionError> {
        let body: JwtResponse = self
            .client
            .post_empty_with_bearer(&self.path, provider_token)
            .await
            .map_err(|e| SessionError::TokenExchange(e.to_string()))?;
        body.into_token()
            .map_err(|e| SessionError::TokenExchange(e.to_string()))
    }
}
