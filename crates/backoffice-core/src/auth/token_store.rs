//! Durable storage for the bearer token.
//!
//! One entry, named `adminToken`, shared by the session manager and the API
//! client's 401 hook. The OS keyring is the default; a JSON file in the cache
//! directory serves headless hosts without a secret service.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use keyring::Entry;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::{TokenBackend, APP_NAME};

/// Name of the persisted token entry
pub const TOKEN_ENTRY: &str = "adminToken";

/// Token file name in the cache directory
const TOKEN_FILE: &str = "admin_token.json";

pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, token: &str) -> Result<()>;
    /// Remove the stored token. Clearing an empty store succeeds.
    fn clear(&self) -> Result<()>;
}

/// Build the store selected by configuration
pub fn open_token_store(backend: TokenBackend) -> Result<Arc<dyn TokenStore>> {
    let store: Arc<dyn TokenStore> = match backend {
        TokenBackend::Keyring => Arc::new(KeyringTokenStore::new()),
        TokenBackend::File => Arc::new(FileTokenStore::new(crate::config::cache_dir()?)),
    };
    Ok(store)
}

// ============================================================================
// Keyring
// ============================================================================

pub struct KeyringTokenStore {
    service: String,
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self {
            service: APP_NAME.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, TOKEN_ENTRY).context("Failed to create keyring entry")
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn load(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read token from keychain"),
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        self.entry()?
            .set_password(token)
            .context("Failed to store token in keychain")
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

// ============================================================================
// File
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    #[serde(rename = "adminToken")]
    token: String,
    saved_at: DateTime<Utc>,
}

pub struct FileTokenStore {
    cache_dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    fn token_path(&self) -> PathBuf {
        self.cache_dir.join(TOKEN_FILE)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        let path = self.token_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read token file")?;
        let stored: StoredToken =
            serde_json::from_str(&contents).context("Failed to parse token file")?;
        Ok(Some(stored.token))
    }

    fn save(&self, token: &str) -> Result<()> {
        let path = self.token_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let stored = StoredToken {
            token: token.to_string(),
            saved_at: Utc::now(),
        };
        std::fs::write(&path, serde_json::to_string_pretty(&stored)?)
            .context("Failed to write token file")?;
        restrict_permissions(&path)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.token_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove token file")?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .context("Failed to restrict token file permissions")
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &std::path::Path) -> Result<()> {
    Ok(())
}

// ============================================================================
// Memory
// ============================================================================

/// Process-local store that forgets the token on exit
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.token.lock().clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.token.lock() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileTokenStore::new(dir.path().join("cache"));

        assert_eq!(store.load().expect("empty load"), None);
        store.save("tok-123").expect("save");
        assert_eq!(store.load().expect("load").as_deref(), Some("tok-123"));

        let raw = std::fs::read_to_string(dir.path().join("cache").join(TOKEN_FILE)).expect("raw");
        assert!(raw.contains("\"adminToken\""));

        store.clear().expect("clear");
        assert_eq!(store.load().expect("load after clear"), None);
        store.clear().expect("second clear");
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::with_token("abc");
        assert_eq!(store.load().expect("load").as_deref(), Some("abc"));
        store.clear().expect("clear");
        assert_eq!(store.load().expect("load"), None);
    }
}
