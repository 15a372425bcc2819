//! Routing and access control for FoodGully views.
//!
//! The app's views are listed in one table ([`Route`]). Some of them are
//! protected: they only make sense for a signed-in user. [`guard`] decides
//! for one protected request, [`navigate`] combines the table lookup with
//! the guard, and [`post_login_target`] picks where a finished sign-in
//! should land.
//!
//! Everything here is a pure function of the published
//! [`Session`](foodgully_session::Session). A view re-runs the decision on
//! every session change, which is how `Loading` turns into a render or a
//! redirect once the provider has reported.

mod error;
mod guard;
mod route;

pub use error::RouteError;
pub use guard::{GuardDecision, HOME_PATH, LOGIN_PATH, Navigation, guard, navigate, post_login_target};
pub use route::Route;
