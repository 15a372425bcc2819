//! The identity-provider seam.
//!
//! FoodGully doesn't verify passwords or run OAuth itself; a third-party
//! identity provider does (Firebase Auth, Auth0, Supabase, ...). This
//! module defines the [`IdentityProvider`] trait the session controller
//! drives. Implement it over your provider's SDK or REST API; tests
//! implement it with a scripted fake.

use std::future::Future;

use foodgully_protocol::{ProfileUpdate, ProviderUser};
use tokio::sync::mpsc;

use crate::SessionError;

/// The stream of provider state changes.
///
/// Each item is the signed-in user, or `None` for "nobody is signed in".
/// The provider sends one item per actual change, starting with the
/// current state as soon as it is known.
pub type StateChanges = mpsc::UnboundedReceiver<Option<ProviderUser>>;

/// An external identity provider.
///
/// Credential operations report failures as [`SessionError::Credential`]
/// (user-correctable) or [`SessionError::Network`] (transient). A
/// successful sign-in is also announced on [`state_changes`]; the session
/// controller publishes state from that stream only.
///
/// [`state_changes`]: IdentityProvider::state_changes
///
/// # Trait bounds
///
/// `Send + Sync + 'static` because the controller shares the provider
/// with the tasks that process notifications.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Creates a password account. Most providers also sign it in.
    fn create_account_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<ProviderUser, SessionError>> + Send;

    /// Verifies email and password.
    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<ProviderUser, SessionError>> + Send;

    /// Runs the federated (popup/redirect) sign-in flow.
    fn sign_in_with_federated_popup(
        &self,
    ) -> impl Future<Output = Result<ProviderUser, SessionError>> + Send;

    /// Ends the provider-side session.
    fn sign_out(&self) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Changes display name and/or avatar of the signed-in account.
    fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Deletes the signed-in account.
    fn delete_account(&self) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Returns an identity token for `user`. With `force_refresh` the
    /// provider must mint a new one rather than return a cached,
    /// possibly expired token.
    fn get_fresh_id_token(
        &self,
        user: &ProviderUser,
        force_refresh: bool,
    ) -> impl Future<Output = Result<String, SessionError>> + Send;

    /// Subscribes to state changes. Called once, by
    /// [`SessionController::start`](crate::SessionController::start).
    fn state_changes(&self) -> StateChanges;
}
