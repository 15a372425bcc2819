//! `FoodGully` builder and client.
//!
//! This is the entry point for an application. It ties the layers
//! together: one token store, one HTTP client reading from it, and one
//! session controller writing to it.

use foodgully_protocol::{Food, FoodDraft, InsertResult, UserIdentity};
use foodgully_routes::Navigation;
use foodgully_session::{
    IdentityProvider, SessionConfig, SessionController, SessionError, TokenStore,
};
use foodgully_transport::HttpClient;
use tokio::task::JoinHandle;

use crate::{ClientConfig, FoodGullyError, FoodsApi};

const USER_AGENT: &str = concat!("foodgully/", env!("CARGO_PKG_VERSION"));

/// Builder for configuring a FoodGully client.
///
/// # Example
///
/// ```rust,ignore
/// use foodgully::prelude::*;
///
/// let app = FoodGullyBuilder::new()
///     .config(ClientConfig::from_env())
///     .build(my_provider)?;
/// app.start();
/// ```
pub struct FoodGullyBuilder {
    config: ClientConfig,
    store: Option<TokenStore>,
}

impl FoodGullyBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            store: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the backend base URL.
    pub fn api_base_url(mut self, url: &str) -> Self {
        self.config.api_base_url = url.to_string();
        self
    }

    /// Uses `store` instead of the one derived from the configuration.
    pub fn token_store(mut self, store: TokenStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Builds the client around `provider`.
    ///
    /// Doesn't subscribe to the provider yet; call
    /// [`FoodGully::start`] for that.
    ///
    /// # Errors
    /// [`FoodGullyError::Transport`] if the base URL is invalid.
    pub fn build<P: IdentityProvider>(self, provider: P) -> Result<FoodGully<P>, FoodGullyError> {
        let store = match self.store {
            Some(store) => store,
            None => open_store(&self.config),
        };

        let http = HttpClient::builder(&self.config.api_base_url)
            .timeout(self.config.timeout)
            .user_agent(USER_AGENT)
            .bearer_auth(store.clone())
            .build()?;

        let session_config = SessionConfig {
            exchange_path: self.config.exchange_path.clone(),
            ..SessionConfig::default()
        };
        let session =
            SessionController::with_backend(provider, http.clone(), store.clone(), session_config);

        tracing::info!(base_url = %http.base_url(), "foodgully client ready");

        Ok(FoodGully {
            foods: FoodsApi::new(http.clone()),
            http,
            store,
            session,
        })
    }
}

impl Default for FoodGullyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn open_store(config: &ClientConfig) -> TokenStore {
    match config.token_file() {
        Some(path) => {
            tracing::debug!(path = %path.display(), "using file token store");
            TokenStore::open_file(path)
        }
        None => {
            if config.persist_token {
                tracing::warn!("no home directory, access token will not survive a restart");
            }
            TokenStore::in_memory()
        }
    }
}

/// A configured FoodGully client.
///
/// Cheap to clone. Clones share the token store, the HTTP client, and
/// the session.
pub struct FoodGully<P: IdentityProvider> {
    http: HttpClient,
    store: TokenStore,
    session: SessionController<P>,
    foods: FoodsApi,
}

impl<P: IdentityProvider> Clone for FoodGully<P> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            store: self.store.clone(),
            session: self.session.clone(),
            foods: self.foods.clone(),
        }
    }
}

impl<P: IdentityProvider> FoodGully<P> {
    /// Subscribes the session controller to the provider.
    /// Returns `None` if already started.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        self.session.start()
    }

    pub fn session(&self) -> &SessionController<P> {
        &self.session
    }

    pub fn foods(&self) -> &FoodsApi {
        &self.foods
    }

    /// The shared HTTP client, for endpoints without a typed wrapper.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.store
    }

    /// Resolves `path` for the current session.
    pub fn navigate(&self, path: &str) -> Result<Navigation, FoodGullyError> {
        Ok(foodgully_routes::navigate(&self.session.current(), path)?)
    }

    /// Lists `draft` under the signed-in user.
    ///
    /// # Errors
    /// [`SessionError::NoActiveSession`] when nobody is signed in.
    pub async fn list_food(&self, draft: FoodDraft) -> Result<InsertResult, FoodGullyError> {
        let donor = self.signed_in()?;
        Ok(self.foods.add(draft, &donor).await?)
    }

    /// Requests `food` for pickup as the signed-in user.
    ///
    /// # Errors
    /// [`SessionError::NoActiveSession`] when nobody is signed in.
    pub async fn request_food(
        &self,
        food: &Food,
        notes: &str,
    ) -> Result<InsertResult, FoodGullyError> {
        let requester = self.signed_in()?;
        Ok(self.foods.request(food, &requester, notes).await?)
    }

    fn signed_in(&self) -> Result<UserIdentity, SessionError> {
        self.session
            .current()
            .identity()
            .cloned()
            .ok_or(SessionError::NoActiveSession)
    }
}
