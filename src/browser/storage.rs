use tracing::warn;

use crate::config::{CONFIG_STORAGE_KEY, GameConfig};
use crate::error::StoreError;
use crate::leaderboard::StorageLeaderboard;
use crate::profile::{Profile, ProfileStore};

/// `window.localStorage`, looked up on every call.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebProfileStore;

impl WebProfileStore {
    fn storage(&self) -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(StoreError::Unavailable)
    }
}

impl ProfileStore for WebProfileStore {
    fn get_string(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage()?
            .get_item(key)
            .map_err(|_| StoreError::Unavailable)
    }

    fn set_string(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|_| StoreError::WriteRejected { key: key.to_string() })
    }
}

pub type WebProfile = Profile<WebProfileStore>;
pub type WebLeaderboard = StorageLeaderboard<WebProfileStore>;

pub fn web_profile(config: &GameConfig) -> WebProfile {
    Profile::new(WebProfileStore, config.callsign_max_len)
}

pub fn web_leaderboard() -> WebLeaderboard {
    StorageLeaderboard::new(WebProfileStore)
}

pub fn load_config() -> GameConfig {
    let raw = match WebProfileStore.get_string(CONFIG_STORAGE_KEY) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(error = %err, "config override unreadable");
            None
        }
    };
    GameConfig::from_stored(raw.as_deref())
}
