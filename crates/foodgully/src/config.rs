//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use foodgully_session::{DEFAULT_EXCHANGE_PATH, TOKEN_FILE};

/// Environment variable overriding [`ClientConfig::api_base_url`].
pub const API_URL_ENV: &str = "FOODGULLY_API_URL";

/// Environment variable overriding [`ClientConfig::home_dir`].
pub const HOME_ENV: &str = "FOODGULLY_HOME";

/// The production backend.
pub const DEFAULT_API_URL: &str = "https://food-gully-server.vercel.app";

/// `~/.config/foodgully`, if the home directory is known.
pub fn default_home() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("foodgully"))
}

/// Configuration for a [`FoodGully`](crate::FoodGully) client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the backend. Every API path is joined onto it.
    pub api_base_url: String,

    /// Directory for client state (the token file). `None` if it can't be
    /// determined, in which case the token is kept in memory only.
    pub home_dir: Option<PathBuf>,

    /// Backend path that issues application tokens. Default: `/jwt`.
    pub exchange_path: String,

    /// Keep the application token across restarts. Default: `true`.
    pub persist_token: bool,

    /// Per-request timeout. Default: 30 seconds.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            home_dir: default_home(),
            exchange_path: DEFAULT_EXCHANGE_PATH.to_string(),
            persist_token: true,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Defaults, overridden by `FOODGULLY_API_URL` and `FOODGULLY_HOME`.
    /// Empty variables count as unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();
        if let Some(url) = var(API_URL_ENV) {
            config.api_base_url = url;
        }
        if let Some(home) = var(HOME_ENV) {
            config.home_dir = Some(PathBuf::from(home));
        }
        config
    }

    /// Where the token is persisted, or `None` for an in-memory store.
    pub fn token_file(&self) -> Option<PathBuf> {
        if !self.persist_token {
            return None;
        }
        self.home_dir.as_ref().map(|home| home.join(TOKEN_FILE))
    }
}
