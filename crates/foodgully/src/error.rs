//! Unified error type for the FoodGully client.

use foodgully_protocol::ProtocolError;
use foodgully_routes::RouteError;
use foodgully_session::SessionError;
use foodgully_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `foodgully` crate, you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum FoodGullyError {
    /// An HTTP-level error (bad URL, network, non-2xx status, decode).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A wire-format error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (credentials, provider, no session).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A navigation path that isn't an internal path.
    #[error(transparent)]
    Route(#[from] RouteError),
}

impl FoodGullyError {
    /// Returns `true` if the backend answered 401 or 403, i.e. the stored
    /// token was missing, expired, or not good enough for the call.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Transport(e) if matches!(e.status(), Some(401 | 403))
        )
    }
}
