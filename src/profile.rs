//! Local player profile: callsign, personal best and games played, kept in
//! a string key/value store.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{RegistrationError, StoreError};

pub const USERNAME_KEY: &str = "livepuzzle_username";
pub const BEST_KEY: &str = "livepuzzle_best";
pub const GAMES_PLAYED_KEY: &str = "livepuzzle_games_played";
pub const GUEST_NAME: &str = "GUEST";

pub trait ProfileStore {
    fn get_string(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_string(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub seconds: u64,
    pub new_personal_best: bool,
    pub games_played: u32,
}

/// Trims, truncates to `max_len` characters and uppercases a raw callsign.
pub fn normalize_callsign(raw: &str, max_len: usize) -> String {
    let truncated: String = raw.trim().chars().take(max_len).collect();
    truncated.trim_end().to_uppercase()
}

#[derive(Debug)]
pub struct Profile<S> {
    store: S,
    max_name_len: usize,
}

impl<S: ProfileStore> Profile<S> {
    pub fn new(store: S, max_name_len: usize) -> Self {
        Self { store, max_name_len }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get_string(key) {
            Ok(v) => v,
            Err(err) => {
                warn!(key, error = %err, "profile read failed");
                None
            }
        }
    }

    /// `None` on a first visit, `Some("")` once registration was skipped.
    pub fn username(&self) -> Option<String> {
        self.read(USERNAME_KEY)
    }

    pub fn is_first_visit(&self) -> bool {
        self.username().is_none()
    }

    /// A registered callsign, i.e. neither a first visit nor a skip.
    pub fn registered_name(&self) -> Option<String> {
        self.username().filter(|n| !n.is_empty())
    }

    pub fn display_name(&self) -> String {
        self.registered_name().unwrap_or_else(|| GUEST_NAME.to_string())
    }

    /// Stores the normalized callsign and returns it.
    pub fn register(&self, raw: &str) -> Result<String, RegistrationError> {
        let name = normalize_callsign(raw, self.max_name_len);
        if name.is_empty() {
            return Err(RegistrationError::EmptyName);
        }
        self.store.set_string(USERNAME_KEY, &name)?;
        info!(name = %name, "callsign registered");
        Ok(name)
    }

    pub fn skip_registration(&self) -> Result<(), StoreError> {
        self.store.set_string(USERNAME_KEY, "")
    }

    pub fn personal_best(&self) -> Option<u64> {
        let raw = self.read(BEST_KEY)?;
        match raw.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(value = %raw, "ignoring malformed personal best");
                None
            }
        }
    }

    pub fn games_played(&self) -> u32 {
        self.read(GAMES_PLAYED_KEY)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Counts the game and keeps the lower of the stored and new best.
    pub fn record_completion(&self, seconds: u64) -> Result<CompletionRecord, StoreError> {
        let games_played = self.games_played().saturating_add(1);
        self.store.set_string(GAMES_PLAYED_KEY, &games_played.to_string())?;

        let new_personal_best = self.personal_best().is_none_or(|best| seconds < best);
        if new_personal_best {
            self.store.set_string(BEST_KEY, &seconds.to_string())?;
        }
        info!(seconds, games_played, new_personal_best, "completion recorded");
        Ok(CompletionRecord {
            seconds,
            new_personal_best,
            games_played,
        })
    }
}
