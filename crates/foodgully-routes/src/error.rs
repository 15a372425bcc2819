//! Error types for the routing layer.

/// Errors that can occur while parsing a navigation path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// Paths are absolute within the app: they must start with `/`.
    #[error("path {0:?} does not start with '/'")]
    NotAbsolute(String),

    /// The path points outside the app, e.g. `//evil.example` or a
    /// backslash that browsers treat as a separator.
    #[error("path {0:?} is not an internal path")]
    External(String),
}
