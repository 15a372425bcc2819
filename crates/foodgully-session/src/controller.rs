//! The session controller: turns identity-provider events into a session.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Listening to the provider's state changes for the life of the process
//! - Trading each provider credential for an application token (`/jwt`)
//! - Keeping the [`TokenStore`] in step with the published [`Session`]
//! - The user-facing credential operations (sign in/out, register, ...)
//!
//! # Ordering
//!
//! Every provider notification gets a sequence number when it arrives and
//! is resolved on its own task. A result is applied only if its number is
//! still the latest one issued; otherwise a newer event has already taken
//! over and the result is dropped. The comparison, the token-store write,
//! and the publication happen under one lock, so a late exchange can never
//! overwrite the state a newer event produced. Local sign-out takes a
//! sequence number too, which is how it cancels an exchange in flight.
//!
//! The token-store write may hit the disk, so results are applied on the
//! blocking pool and the lock is never held on a runtime worker.
//!
//! # Fail-closed
//!
//! A provider-authenticated user whose exchange fails is published as
//! unauthenticated with an empty token store. Without an application token
//! nothing in the backend would work for them anyway.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use foodgully_protocol::{ProfileUpdate, ProviderUser, UserIdentity};
use foodgully_transport::HttpClient;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::policy::{check_email, check_password};
use crate::{
    BackendExchange, IdentityProvider, Session, SessionConfig, SessionError,
    SessionStatus, TokenExchange, TokenStore,
};

/// Sequence numbers handed out to notifications and local sign-outs.
#[derive(Debug, Default)]
struct Sequence {
    /// The newest number handed out. Only a result carrying this number
    /// may be applied.
    issued: u64,
    /// The number of the last result that was applied.
    applied: u64,
}

/// What resolving one event decided.
enum Outcome {
    Authenticated { identity: UserIdentity, token: String },
    SignedOut,
}

struct Inner<P, E> {
    provider: P,
    exchange: E,
    store: TokenStore,
    config: SessionConfig,
    state: watch::Sender<Session>,
    seq: Mutex<Sequence>,
    started: AtomicBool,
}

impl<P: IdentityProvider, E: TokenExchange> Inner<P, E> {
    fn issue(&self) -> u64 {
        let mut seq = self.seq.lock();
        seq.issued += 1;
        seq.issued
    }

    /// Applies `outcome` if `seq` is still the latest event.
    /// Returns `false` when the result was superseded and dropped.
    fn apply(&self, seq: u64, outcome: Outcome) -> bool {
        let mut guard = self.seq.lock();
        if seq != guard.issued {
            tracing::debug!(seq, latest = guard.issued, "discarding superseded session result");
            return false;
        }
        guard.applied = seq;

        match outcome {
            Outcome::Authenticated { identity, token } => {
                self.store.set(&token);
                tracing::info!(seq, user = identity.external_id(), "session authenticated");
                self.publish(Session::authenticated(identity));
            }
            Outcome::SignedOut => {
                self.store.clear();
                tracing::info!(seq, "session unauthenticated");
                self.publish(Session::unauthenticated());
            }
        }
        true
    }

    /// [`apply`](Self::apply) on the blocking pool.
    async fn apply_blocking(self: &Arc<Self>, seq: u64, outcome: Outcome) -> bool {
        let inner = Arc::clone(self);
        match tokio::task::spawn_blocking(move || inner.apply(seq, outcome)).await {
            Ok(applied) => applied,
            Err(e) => {
                tracing::error!(seq, error = %e, "session update task failed");
                false
            }
        }
    }

    /// Publishes `next`, waking subscribers only if something changed.
    fn publish(&self, next: Session) {
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    async fn resolve(self: Arc<Self>, seq: u64, user: Option<ProviderUser>) {
        let outcome = match user {
            None => Outcome::SignedOut,
            Some(user) => match self.authenticate(&user).await {
                Ok(token) => Outcome::Authenticated {
                    identity: UserIdentity::from_provider(&user),
                    token,
                },
                Err(e) => {
                    tracing::warn!(seq, uid = %user.uid, error = %e, "backend sign-in failed, treating user as signed out");
                    Outcome::SignedOut
                }
            },
        };
        self.apply_blocking(seq, outcome).await;
    }

    async fn authenticate(&self, user: &ProviderUser) -> Result<String, SessionError> {
        let id_token = self
            .provider
            .get_fresh_id_token(user, self.config.force_refresh)
            .await?;
        self.exchange.exchange(&id_token).await
    }
}

/// Owns the session and the user-facing credential operations.
///
/// Cheap to clone; clones share one state. Views call
/// [`subscribe`](Self::subscribe) to follow the session and the operations
/// below to change it.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ start() ──→ provider events ──→ dispatch() ──→ publish
///                                               │
///                         sign_out() ───────────┘ (supersedes in-flight)
/// ```
pub struct SessionController<P, E = BackendExchange> {
    inner: Arc<Inner<P, E>>,
}

impl<P, E> Clone for SessionController<P, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: IdentityProvider> SessionController<P, BackendExchange> {
    /// A controller that exchanges tokens through `client` at
    /// `config.exchange_path`.
    pub fn with_backend(
        provider: P,
        client: HttpClient,
        store: TokenStore,
        config: SessionConfig,
    ) -> Self {
        let exchange = BackendExchange::with_path(client, &config.exchange_path);
        Self::new(provider, exchange, store, config)
    }
}

impl<P: IdentityProvider, E: TokenExchange> SessionController<P, E> {
    /// Creates a controller in the `Initializing` state.
    pub fn new(provider: P, exchange: E, store: TokenStore, config: SessionConfig) -> Self {
        let (state, _) = watch::channel(Session::initializing());
        Self {
            inner: Arc::new(Inner {
                provider,
                exchange,
                store,
                config,
                state,
                seq: Mutex::new(Sequence::default()),
                started: AtomicBool::new(false),
            }),
        }
    }

    /// Subscribes to the provider and processes its notifications until
    /// the provider closes the stream.
    ///
    /// Returns `None` if the controller was already started; it subscribes
    /// only once.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            tracing::warn!("session controller already started");
            return None;
        }
        let mut changes = self.inner.provider.state_changes();
        let controller = self.clone();
        Some(tokio::spawn(async move {
            while let Some(user) = changes.recv().await {
                controller.dispatch(user);
            }
            tracing::info!("identity provider closed its notification stream");
        }))
    }

    /// Feeds one provider notification through the background protocol.
    ///
    /// The notification is numbered immediately and resolved on its own
    /// task; the returned handle finishes once the result was applied or
    /// dropped as superseded.
    pub fn dispatch(&self, user: Option<ProviderUser>) -> JoinHandle<()> {
        let seq = self.inner.issue();
        tracing::debug!(seq, signed_in = user.is_some(), "provider state changed");
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.resolve(seq, user).await })
    }

    /// The session as of now.
    pub fn current(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// A receiver that sees every published session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Waits until the provider's first state has been resolved.
    pub async fn resolved(&self) -> Session {
        let mut rx = self.subscribe();
        match rx.wait_for(|s| !s.is_initializing()).await {
            Ok(session) => (*session).clone(),
            Err(_) => self.current(),
        }
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.inner.store
    }

    pub fn provider(&self) -> &P {
        &self.inner.provider
    }

    /// Creates a password account.
    ///
    /// Does not publish anything itself: the provider announces the new
    /// user on its notification stream, and that path does the exchange.
    ///
    /// # Errors
    /// [`SessionError::Credential`] for a malformed email, a password that
    /// breaks the policy, or a provider refusal; [`SessionError::Network`]
    /// if the provider can't be reached.
    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderUser, SessionError> {
        check_email(email)?;
        check_password(password)?;
        let user = self
            .inner
            .provider
            .create_account_with_password(email.trim(), password)
            .await?;
        tracing::info!(uid = %user.uid, "account created");
        Ok(user)
    }

    /// Creates an account and sets its display name and avatar.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        profile: ProfileUpdate,
    ) -> Result<ProviderUser, SessionError> {
        let mut user = self.create_account(email, password).await?;
        if !profile.is_empty() {
            self.inner.provider.update_profile(&profile).await?;
            if let Some(name) = profile.display_name {
                user.display_name = Some(name);
            }
            if let Some(url) = profile.photo_url {
                user.photo_url = Some(url);
            }
        }
        Ok(user)
    }

    /// Signs in with email and password.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderUser, SessionError> {
        check_email(email)?;
        let user = self
            .inner
            .provider
            .sign_in_with_password(email.trim(), password)
            .await
            .inspect_err(|e| tracing::info!(error = %e, "password sign-in failed"))?;
        tracing::info!(uid = %user.uid, "signed in with password");
        Ok(user)
    }

    /// Signs in through the provider's federated flow.
    pub async fn sign_in_with_external_provider(&self) -> Result<ProviderUser, SessionError> {
        let user = self
            .inner
            .provider
            .sign_in_with_federated_popup()
            .await
            .inspect_err(|e| tracing::info!(error = %e, "federated sign-in failed"))?;
        tracing::info!(uid = %user.uid, "signed in with federated provider");
        Ok(user)
    }

    /// Signs out locally and at the provider.
    ///
    /// Any exchange still in flight is superseded, the token store is
    /// cleared, and `Unauthenticated` is published before the provider is
    /// contacted. With no session and nothing in flight this does nothing,
    /// so calling it twice is the same as calling it once.
    ///
    /// # Errors
    /// [`SessionError::Network`] if the provider couldn't be told. The
    /// local session is gone either way.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        let nothing_to_do = {
            let seq = self.inner.seq.lock();
            seq.applied == seq.issued
                && self.inner.state.borrow().status() == SessionStatus::Unauthenticated
        };
        if nothing_to_do {
            tracing::debug!("sign-out without a session, nothing to do");
            return Ok(());
        }

        let seq = self.inner.issue();
        self.inner.apply_blocking(seq, Outcome::SignedOut).await;
        self.inner
            .provider
            .sign_out()
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "provider sign-out failed"))
    }

    /// Changes display name and/or avatar of the signed-in user and
    /// publishes the new identity snapshot.
    ///
    /// The snapshot is returned even when another user took over the
    /// session while the provider call ran. It is not published then,
    /// because the session no longer belongs to that user.
    ///
    /// # Errors
    /// [`SessionError::NoActiveSession`] when nobody is signed in.
    pub async fn update_profile(
        &self,
        update: ProfileUpdate,
    ) -> Result<UserIdentity, SessionError> {
        let identity = self
            .current()
            .identity()
            .cloned()
            .ok_or(SessionError::NoActiveSession)?;
        if update.is_empty() {
            return Ok(identity);
        }

        self.inner.provider.update_profile(&update).await?;
        let updated = identity.with_profile(&update);

        // The user may have changed while the provider call was running.
        let _seq = self.inner.seq.lock();
        let still_current = self
            .inner
            .state
            .borrow()
            .identity()
            .is_some_and(|current| current.external_id() == identity.external_id());
        if still_current {
            self.inner.publish(Session::authenticated(updated.clone()));
            tracing::info!(user = updated.external_id(), "profile updated");
        } else {
            tracing::debug!(
                user = updated.external_id(),
                "profile updated after the session changed, snapshot not published"
            );
        }
        Ok(updated)
    }

    /// Deletes the signed-in account and signs out locally.
    ///
    /// # Errors
    /// [`SessionError::NoActiveSession`] when nobody is signed in.
    pub async fn delete_account(&self) -> Result<(), SessionError> {
        if !self.current().is_authenticated() {
            return Err(SessionError::NoActiveSession);
        }
        self.inner.provider.delete_account().await?;
        let seq = self.inner.issue();
        self.inner.apply_blocking(seq, Outcome::SignedOut).await;
        tracing::info!("account deleted");
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================
