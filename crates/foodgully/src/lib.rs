//! # FoodGully
//!
//! Client-side authentication and marketplace access for the FoodGully
//! food-donation platform.
//!
//! A third-party identity provider signs users in. FoodGully trades the
//! provider's credential for an application token at the backend, keeps
//! that token in one store, and attaches it to every API request. Views
//! read the published session and are gated by the route guard.
//!
//! ```text
//!  IdentityProvider ──events──→ SessionController ──writes──→ TokenStore
//!                                      │                          │ reads
//!                                 publishes Session          HttpClient ──→ backend
//!                                      ↓
//!                                 route guard
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use foodgully::prelude::*;
//!
//! // Implement IdentityProvider over your provider's SDK, then:
//! // foodgully::init_tracing();
//! // let app = FoodGullyBuilder::new()
//! //     .config(ClientConfig::from_env())
//! //     .build(my_provider)?;
//! // app.start();
//! // let session = app.session().resolved().await;
//! ```

mod api;
mod client;
mod config;
mod error;
mod logging;

pub use api::FoodsApi;
pub use client::{FoodGully, FoodGullyBuilder};
pub use config::{API_URL_ENV, ClientConfig, DEFAULT_API_URL, HOME_ENV, default_home};
pub use error::FoodGullyError;
pub use logging::{DEFAULT_FILTER, init_tracing};

pub use foodgully_protocol as protocol;
pub use foodgully_routes as routes;
pub use foodgully_session as session;
pub use foodgully_transport as transport;

/// The types most applications need.
pub mod prelude {
    pub use crate::{ClientConfig, FoodGully, FoodGullyBuilder, FoodGullyError, FoodsApi};
    pub use foodgully_protocol::{
        Food, FoodDraft, FoodQuery, FoodStatus, ProfileUpdate, ProviderUser, SortOrder,
        UserIdentity,
    };
    pub use foodgully_routes::{GuardDecision, Navigation, Route, guard, post_login_target};
    pub use foodgully_session::{
        CredentialError, IdentityProvider, Session, SessionController, SessionError,
        SessionStatus, StateChanges, TokenStore,
    };
}
