//! The authentication guard in front of protected views.

use foodgully_session::{Session, SessionStatus};

use crate::{Route, RouteError};

/// Where unauthenticated users are sent.
pub const LOGIN_PATH: &str = "/login";

/// Where a successful sign-in lands when there is nowhere better to go.
pub const HOME_PATH: &str = "/";

// ---------------------------------------------------------------------------
// GuardDecision
// ---------------------------------------------------------------------------

/// What to do with a request for a protected view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// The session isn't known yet. Show a loading indicator and decide
    /// again on the next session change.
    Loading,

    /// Show the requested view.
    Render,

    /// Go to `to`, remembering `from` so a successful sign-in can return
    /// there.
    Redirect { to: &'static str, from: String },
}

/// Decides whether a protected view may render for `session`.
///
/// Pure: the same session and path always give the same decision.
pub fn guard(session: &Session, requested_path: &str) -> GuardDecision {
    match session.status() {
        SessionStatus::Initializing => GuardDecision::Loading,
        SessionStatus::Authenticated => GuardDecision::Render,
        SessionStatus::Unauthenticated => GuardDecision::Redirect {
            to: LOGIN_PATH,
            from: requested_path.to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// The outcome of navigating to a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Loading,
    Show(Route),
    Redirect { to: &'static str, from: String },
}

/// Resolves `path` against the route table and guards it if protected.
///
/// Public views (and the not-found view) render whatever the session.
///
/// # Errors
/// [`RouteError`] if `path` is not an internal absolute path.
pub fn navigate(session: &Session, path: &str) -> Result<Navigation, RouteError> {
    let route = Route::parse(path)?;
    if !route.is_protected() {
        return Ok(Navigation::Show(route));
    }

    let navigation = match guard(session, path) {
        GuardDecision::Loading => Navigation::Loading,
        GuardDecision::Render => Navigation::Show(route),
        GuardDecision::Redirect { to, from } => {
            tracing::debug!(from = %from, "protected view requires sign-in");
            Navigation::Redirect { to, from }
        }
    };
    Ok(navigation)
}

/// Where to go after a successful sign-in.
///
/// Returns `hint` (normally the `from` of a redirect) if it is an internal
/// path other than the login or register views; otherwise [`HOME_PATH`].
pub fn post_login_target(hint: Option<&str>) -> String {
    let Some(hint) = hint else {
        return HOME_PATH.to_string();
    };
    match Route::parse(hint) {
        Ok(Route::Login | Route::Register) => HOME_PATH.to_string(),
        Ok(_) => hint.to_string(),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring return path");
            HOME_PATH.to_string()
        }
    }
}
