//! Error types for the session layer.

use foodgully_protocol::ProtocolError;

/// Why the identity provider (or our own pre-check) refused credentials.
///
/// These are user-correctable: the view shows them next to the form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("email address is malformed")]
    InvalidEmail,

    /// The password doesn't meet the policy; the message says which rule.
    #[error("password is too weak: {0}")]
    WeakPassword(&'static str),

    #[error("an account already exists for this email")]
    EmailInUse,

    #[error("wrong password")]
    WrongPassword,

    #[error("no account exists for this email")]
    UnknownAccount,

    /// The user closed the federated sign-in popup.
    #[error("sign-in was cancelled")]
    Cancelled,

    /// Any other provider-defined refusal, with the provider's message.
    #[error("credentials rejected: {0}")]
    Rejected(String),
}

/// Errors that can occur during session management.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Bad email/password, or a cancelled federated flow.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// A transient failure talking to the identity provider. Not retried
    /// automatically; the user may try again.
    #[error("network error: {0}")]
    Network(String),

    /// The backend refused to issue an application token for the
    /// provider's token. The controller handles this itself by signing out
    /// locally; callers only see it from [`TokenExchange`](crate::TokenExchange)
    /// directly.
    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    /// A profile operation was attempted with nobody signed in.
    #[error("no active session")]
    NoActiveSession,
}

/// Failures of a durable token backend.
///
/// The [`TokenStore`](crate::TokenStore) never surfaces these: it logs
/// them and keeps working from memory.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("token storage io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("token storage is corrupt: {0}")]
    Format(#[from] ProtocolError),
}
