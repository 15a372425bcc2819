//! Session management for the FoodGully client.
//!
//! This crate owns the "who is signed in" question:
//!
//! 1. **Token storage**: the single durable slot for the application
//!    bearer token ([`TokenStore`])
//! 2. **Identity provider**: the seam to whatever verifies credentials
//!    ([`IdentityProvider`] trait)
//! 3. **Token exchange**: trading a provider credential for an application
//!    token at the backend ([`TokenExchange`], [`BackendExchange`])
//! 4. **Session state**: the published [`Session`] and the operations that
//!    change it ([`SessionController`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Routes (above)     ← reads the published Session to gate views
//!     ↕
//! Session (this crate)  ← provider events in, Session + token out
//!     ↕
//! Transport (below)  ← HttpClient, which reads the token from the store
//! ```
//!
//! The token store is the only place the application token lives. The
//! controller is its only writer; the HTTP client only reads it.

#![allow(async_fn_in_trait)]

mod controller;
mod error;
mod exchange;
mod policy;
mod provider;
mod session;
mod store;

pub use controller::SessionController;
pub use error::{CredentialError, SessionError, StoreError};
pub use exchange::{BackendExchange, DEFAULT_EXCHANGE_PATH, TokenExchange};
pub use policy::{MIN_PASSWORD_LEN, check_email, check_password};
pub use provider::{IdentityProvider, StateChanges};
pub use session::{Session, SessionConfig, SessionStatus};
pub use store::{ACCESS_TOKEN_KEY, FileBackend, MemoryBackend, TOKEN_FILE, TokenBackend, TokenStore};
