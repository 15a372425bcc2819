//! The token store: the one place the application bearer token lives.
//!
//! Readers (the HTTP client's interceptor, once per request) see the
//! in-memory copy, so `get` never touches the disk. Writers (only the
//! session controller) replace or clear that copy and then persist it
//! through a [`TokenBackend`].
//!
//! Storage is treated as always available. When a backend fails, the
//! failure is logged and the store carries on from memory.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use foodgully_protocol::{Codec, JsonCodec};
use foodgully_transport::TokenSource;
use parking_lot::RwLock;

use crate::StoreError;

/// The fixed key the bearer token is persisted under.
pub const ACCESS_TOKEN_KEY: &str = "access-token";

/// Filename of the on-disk token map inside the client home directory.
pub const TOKEN_FILE: &str = "tokens.json";

// ---------------------------------------------------------------------------
// Backends
// ---------------------------------------------------------------------------

/// Durable key/value storage for the token store.
pub trait TokenBackend: Send + Sync + 'static {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Keeps nothing beyond the process lifetime.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryBackend;

impl TokenBackend for MemoryBackend {
    fn load(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn save(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

/// A JSON object on disk, `{ "<key>": "<value>", ... }`.
///
/// Written with mode 0600 on unix. Tokens are never logged.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backend for `<home>/tokens.json`.
    pub fn in_dir(home: &Path) -> Self {
        Self::new(home.join(TOKEN_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let bytes = fs::read(&self.path)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        Ok(JsonCodec.decode(&bytes)?)
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = JsonCodec.encode(map)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        file.write_all(&bytes)?;
        Ok(())
    }
}

impl TokenBackend for FileBackend {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_map()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.read_map().unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "discarding unreadable token file");
            BTreeMap::new()
        });
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TokenStore
// ---------------------------------------------------------------------------

struct Inner {
    current: RwLock<Option<String>>,
    backend: Box<dyn TokenBackend>,
}

/// Process-wide holder of the bearer token.
///
/// Cloning shares the same token. The value is swapped whole under a
/// lock, so a reader racing a rotation sees the old token or the new one,
/// never a mix.
#[derive(Clone)]
pub struct TokenStore {
    inner: Arc<Inner>,
}

impl TokenStore {
    /// A store that forgets the token when the process exits.
    pub fn in_memory() -> Self {
        Self::open(MemoryBackend)
    }

    /// A store backed by a JSON file at `path`.
    pub fn open_file(path: impl Into<PathBuf>) -> Self {
        Self::open(FileBackend::new(path))
    }

    /// Opens a store over `backend`, picking up a previously persisted token.
    pub fn open(backend: impl TokenBackend) -> Self {
        let initial = backend.load(ACCESS_TOKEN_KEY).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not load persisted token, starting empty");
            None
        });
        tracing::debug!(restored = initial.is_some(), "token store opened");
        Self {
            inner: Arc::new(Inner {
                current: RwLock::new(initial),
                backend: Box::new(backend),
            }),
        }
    }

    /// Stores `token`, replacing any previous one.
    pub fn set(&self, token: &str) {
        *self.inner.current.write() = Some(token.to_string());
        if let Err(e) = self.inner.backend.save(ACCESS_TOKEN_KEY, token) {
            tracing::warn!(error = %e, "failed to persist access token");
        }
    }

    /// The current token, if any.
    pub fn get(&self) -> Option<String> {
        self.inner.current.read().clone()
    }

    /// Removes the token. Clearing an empty store is fine.
    pub fn clear(&self) {
        let had_token = self.inner.current.write().take().is_some();
        if let Err(e) = self.inner.backend.remove(ACCESS_TOKEN_KEY) {
            tracing::warn!(error = %e, "failed to remove persisted access token");
        }
        if had_token {
            tracing::debug!("access token cleared");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.current.read().is_none()
    }
}

impl TokenSource for TokenStore {
    fn token(&self) -> Option<String> {
        self.get()
    }
}
