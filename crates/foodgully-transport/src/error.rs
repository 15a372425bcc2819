use foodgully_protocol::ProtocolError;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The base URL or a request path could not be turned into a URL.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The path resolved to a URL that isn't under the base endpoint
    /// (another host, another scheme, or above the base path). Nothing is
    /// sent, so the stored token can't leak.
    #[error("{0} is outside the api base url")]
    OutsideBase(String),

    /// A resource id can't be used as a single path segment.
    #[error("invalid path segment {0:?}")]
    InvalidSegment(String),

    /// Building or sending the request failed (DNS, TLS, connection reset,
    /// timeout).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body didn't have the expected shape.
    #[error(transparent)]
    Decode(#[from] ProtocolError),

    /// An interceptor rejected the request before it was sent.
    #[error("interceptor {name} rejected request: {reason}")]
    Interceptor { name: &'static str, reason: String },
}

impl TransportError {
    /// The HTTP status, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` for failures where no answer came back from the
    /// server. These are the transient ones a user may retry.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Request(_))
    }
}
