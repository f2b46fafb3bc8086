//! Adapters between the engine and the page: pose events, canvas drawing,
//! audio cues and local storage.

pub mod audio;
pub mod canvas;
pub mod hands;
pub mod storage;

use crate::error::BrowserError;

pub fn window() -> Result<web_sys::Window, BrowserError> {
    web_sys::window().ok_or(BrowserError::NoWindow)
}
