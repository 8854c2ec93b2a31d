//! Persisted bearer-token slot.
//!
//! One token per installation, stored under [`ID_TOKEN_KEY`]:
//! - file-backed under the local data directory on native platforms
//! - browser `localStorage` on wasm

use std::sync::Mutex;

#[cfg(not(target_arch = "wasm32"))]
use std::{fs, path::PathBuf};

pub const ID_TOKEN_KEY: &str = "idToken";

pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str) -> Result<(), String>;
    fn clear(&self) -> Result<(), String>;
}

#[derive(Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.slot.lock().ok()?.clone()
    }

    fn save(&self, token: &str) -> Result<(), String> {
        let mut slot = self.slot.lock().map_err(|e| e.to_string())?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), String> {
        let mut slot = self.slot.lock().map_err(|e| e.to_string())?;
        *slot = None;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub struct FileTokenStore {
    dir: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileTokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data_local_dir>/chatdesk`, or `cache/` relative to the working directory.
    pub fn default_location() -> Self {
        let dir = dirs::data_local_dir()
            .map(|d| d.join("chatdesk"))
            .unwrap_or_else(|| PathBuf::from("cache"));
        Self::new(dir)
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(ID_TOKEN_KEY)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let raw = fs::read_to_string(self.token_path()).ok()?;
        let token = raw.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    fn save(&self, token: &str) -> Result<(), String> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| format!("Failed to create token directory: {}", e))?;
        fs::write(self.token_path(), token).map_err(|e| format!("Failed to write token: {}", e))
    }

    fn clear(&self) -> Result<(), String> {
        let path = self.token_path();
        if path.exists() {
            fs::remove_file(path).map_err(|e| format!("Failed to remove token: {}", e))?;
        }
        Ok(())
    }
}

/// `localStorage` entry shared by every tab of the origin.
#[cfg(target_arch = "wasm32")]
#[derive(Default)]
pub struct LocalStorageTokenStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageTokenStore {
    fn storage() -> Result<web_sys::Storage, String> {
        web_sys::window()
            .ok_or_else(|| "no browser window".to_string())?
            .local_storage()
            .map_err(|e| format!("localStorage unavailable: {e:?}"))?
            .ok_or_else(|| "localStorage unavailable".to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl TokenStore for LocalStorageTokenStore {
    fn load(&self) -> Option<String> {
        let token = Self::storage().ok()?.get_item(ID_TOKEN_KEY).ok()??;
        (!token.trim().is_empty()).then_some(token)
    }

    fn save(&self, token: &str) -> Result<(), String> {
        Self::storage()?
            .set_item(ID_TOKEN_KEY, token)
            .map_err(|e| format!("Failed to write token: {e:?}"))
    }

    fn clear(&self) -> Result<(), String> {
        Self::storage()?
            .remove_item(ID_TOKEN_KEY)
            .map_err(|e| format!("Failed to remove token: {e:?}"))
    }
}

/// The store used by the app on the current platform.
pub fn platform_store() -> Box<dyn TokenStore> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        Box::new(FileTokenStore::default_location())
    }
    #[cfg(target_arch = "wasm32")]
    {
        Box::new(LocalStorageTokenStore)
    }
}
