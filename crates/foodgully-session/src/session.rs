//! Session types: what the rest of the app knows about who is signed in.

use foodgully_protocol::UserIdentity;

use crate::exchange::DEFAULT_EXCHANGE_PATH;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for the session controller.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Backend path that issues application tokens. Default: `/jwt`.
    pub exchange_path: String,

    /// Ask the provider for a freshly minted identity token before every
    /// exchange. Default: `true`. A cached token may already be expired by
    /// the time the backend checks it.
    pub force_refresh: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            exchange_path: DEFAULT_EXCHANGE_PATH.to_string(),
            force_refresh: true,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// Where the session is in its lifecycle.
///
/// ```text
///                 ┌──→ Authenticated ──┐
///   Initializing ─┤         ↑          │ (sign-out / "no user" /
///                 │         │(sign-in)  │  exchange failure)
///                 └──→ Unauthenticated ←┘
/// ```
///
/// `Initializing` only holds until the identity provider first reports
/// its state. After that the session is always one of the other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    Initializing,
    Authenticated,
    Unauthenticated,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The published session: a status, and the identity when authenticated.
///
/// Fields are private and the constructors are the only way to build one,
/// so `status == Authenticated` holds exactly when an identity is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    status: SessionStatus,
    identity: Option<UserIdentity>,
}

impl Session {
    /// Before the identity provider has reported anything.
    pub fn initializing() -> Self {
        Self {
            status: SessionStatus::Initializing,
            identity: None,
        }
    }

    pub fn authenticated(identity: UserIdentity) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            identity: Some(identity),
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            status: SessionStatus::Unauthenticated,
            identity: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn identity(&self) -> Option<&UserIdentity> {
        self.identity.as_ref()
    }

    /// The "loading" flag views show a spinner for.
    pub fn is_initializing(&self) -> bool {
        self.status == SessionStatus::Initializing
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::initializing()
    }
}
