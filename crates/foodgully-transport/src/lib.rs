//! HTTP transport for the FoodGully client.
//!
//! Provides one shared [`HttpClient`] and the two traits that plug into it:
//!
//! - [`RequestInterceptor`]: a synchronous hook that may edit every
//!   outgoing request before it is sent.
//! - [`TokenSource`]: a read-only view of wherever the bearer token lives.
//!   [`BearerAuth`] is the interceptor that joins the two.
//!
//! The client never writes the token. It only asks the source for the
//! current value, once per request.

mod error;
mod http;

pub use error::TransportError;
pub use http::{BearerAuth, HttpClient, HttpClientBuilder, resource_path};

/// Re-exported so callers can name methods and requests without a direct
/// `reqwest` dependency.
pub use reqwest::{Method, Request};

/// Edits an outgoing request before transmission.
///
/// Interceptors run in registration order, synchronously, right before the
/// request is handed to the network. They must not perform I/O or block.
///
/// Returning an error rejects the request: it is never sent, and the error
/// reaches the caller exactly as the interceptor produced it.
pub trait RequestInterceptor: Send + Sync + 'static {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Mutates the request in place.
    fn intercept(&self, request: &mut Request) -> Result<(), TransportError>;
}

/// A read-only source of the current bearer token.
///
/// `Send + Sync + 'static` because the HTTP client is shared by every task
/// that talks to the backend, and each of them reads the token.
pub trait TokenSource: Send + Sync + 'static {
    /// Returns the current token, or `None` if there is none.
    /// Must be cheap and side-effect-free; it is called once per request.
    fn token(&self) -> Option<String>;
}
