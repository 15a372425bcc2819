//! The route table.

use std::fmt;

use crate::RouteError;

// ---------------------------------------------------------------------------
// Route
// ---------------------------------------------------------------------------

/// Every view the app can show.
///
/// ```text
/// /                   Home
/// /available-foods    AvailableFoods
/// /food/:id           FoodDetails      (protected)
/// /add-food           AddFood          (protected)
/// /manage-foods       ManageFoods      (protected)
/// /my-requests        MyRequests       (protected)
/// /login              Login
/// /register           Register
/// anything else       NotFound
/// ```
///
/// Protected views are only rendered for an authenticated session; see
/// [`guard`](crate::guard).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    AvailableFoods,
    FoodDetails { id: String },
    AddFood,
    ManageFoods,
    MyRequests,
    Login,
    Register,
    /// Carries the unmatched path so the view can echo it.
    NotFound { path: String },
}

impl Route {
    /// Matches `path` against the table.
    ///
    /// A query string or fragment is ignored, as are trailing slashes.
    ///
    /// # Errors
    /// [`RouteError::NotAbsolute`] if `path` doesn't start with `/`,
    /// [`RouteError::External`] if it would leave the app.
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let path = strip_suffixes(path);
        check_internal(path)?;

        let trimmed = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };

        let route = match trimmed {
            "/" => Self::Home,
            "/available-foods" => Self::AvailableFoods,
            "/add-food" => Self::AddFood,
            "/manage-foods" => Self::ManageFoods,
            "/my-requests" => Self::MyRequests,
            "/login" => Self::Login,
            "/register" => Self::Register,
            other => match other.strip_prefix("/food/") {
                Some(id) if !id.is_empty() && !id.contains('/') => Self::FoodDetails {
                    id: id.to_string(),
                },
                _ => Self::NotFound {
                    path: trimmed.to_string(),
                },
            },
        };
        Ok(route)
    }

    /// Returns `true` if only a signed-in user may see this view.
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Self::FoodDetails { .. } | Self::AddFood | Self::ManageFoods | Self::MyRequests
        )
    }

    /// The canonical path of this route.
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::AvailableFoods => "/available-foods".to_string(),
            Self::FoodDetails { id } => format!("/food/{id}"),
            Self::AddFood => "/add-food".to_string(),
            Self::ManageFoods => "/manage-foods".to_string(),
            Self::MyRequests => "/my-requests".to_string(),
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::NotFound { path } => path.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Drops `?query` and `#fragment`.
fn strip_suffixes(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

/// A path is internal if it is absolute and can't be read as a
/// protocol-relative URL.
fn check_internal(path: &str) -> Result<(), RouteError> {
    if !path.starts_with('/') {
        return Err(RouteError::NotAbsolute(path.to_string()));
    }
    if path.starts_with("//") || path.contains('\\') {
        return Err(RouteError::External(path.to_string()));
    }
    Ok(())
}
