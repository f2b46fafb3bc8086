//! Error types shared by the engine and its adapters.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("pixel buffer of {width}x{height} needs {expected} bytes, got {actual}")]
    LengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("image has zero area ({width}x{height})")]
    Empty { width: u32, height: u32 },
    #[error("crop {x},{y} {width}x{height} exceeds image bounds {bounds_w}x{bounds_h}")]
    CropOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        bounds_w: u32,
        bounds_h: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("local storage is unavailable")]
    Unavailable,
    #[error("write to key `{key}` was rejected")]
    WriteRejected { key: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeaderboardError {
    #[error("leaderboard store is unavailable")]
    Unavailable,
    #[error("leaderboard data could not be decoded: {0}")]
    Decode(String),
    #[error("leaderboard write was rejected: {0}")]
    Write(String),
}

impl From<serde_json::Error> for LeaderboardError {
    fn from(err: serde_json::Error) -> Self {
        LeaderboardError::Decode(err.to_string())
    }
}

impl From<StoreError> for LeaderboardError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable => LeaderboardError::Unavailable,
            StoreError::WriteRejected { key } => LeaderboardError::Write(key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("callsign must not be empty")]
    EmptyName,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures inside the browser adapters. Never crosses into the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrowserError {
    #[error("no global window")]
    NoWindow,
    #[error("2d canvas context unavailable")]
    NoContext,
    #[error("javascript error: {0}")]
    Js(String),
    #[error(transparent)]
    Image(#[from] ImageError),
}

impl From<wasm_bindgen::JsValue> for BrowserError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        BrowserError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}
