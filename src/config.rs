//! Tunables for the gesture engine. Defaults match a 640x480 feed at ~30fps.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::state::landmark::FrameSize;

pub const CONFIG_STORAGE_KEY: &str = "livepuzzle_config";

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinchConfig {
    /// Smoothed distance (px) a resting hand must drop below to start pinching.
    pub grab_threshold: f64,
    /// Smoothed distance (px) a pinching hand must exceed to release.
    pub release_threshold: f64,
    pub smoothing_alpha: f64,
    /// Consecutive disagreeing frames needed to flip the confirmed state.
    pub confirm_frames: u32,
    /// Frame the pixel thresholds were tuned against.
    pub reference_frame: FrameSize,
}

impl Default for PinchConfig {
    fn default() -> Self {
        Self {
            grab_threshold: 30.0,
            release_threshold: 50.0,
            smoothing_alpha: 0.35,
            confirm_frames: 5,
            reference_frame: FrameSize::REFERENCE,
        }
    }
}

impl PinchConfig {
    /// Rescales the pixel thresholds to `frame`, keeping the same physical
    /// pinch sensitivity as at the reference resolution.
    pub fn scaled_to(&self, frame: FrameSize) -> Self {
        let factor = frame.diagonal() / self.reference_frame.diagonal().max(f64::EPSILON);
        Self {
            grab_threshold: self.grab_threshold * factor,
            release_threshold: self.release_threshold * factor,
            reference_frame: frame,
            ..*self
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub frame: FrameSize,
    /// Side of the square puzzle board in frame pixels; the board is centred.
    pub grid_side: f64,
    pub pinch: PinchConfig,
    /// Instantaneous pinch distance (px) both hands need to trigger a capture.
    pub capture_threshold: f64,
    /// Drag input is ignored for this long after a capture.
    pub grace_period_ms: u64,
    pub shuffle_swaps: u32,
    pub leaderboard_size: usize,
    pub callsign_max_len: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            frame: FrameSize::REFERENCE,
            grid_side: 480.0,
            pinch: PinchConfig::default(),
            capture_threshold: 30.0,
            grace_period_ms: 1000,
            shuffle_swaps: 200,
            leaderboard_size: 5,
            callsign_max_len: 12,
        }
    }
}

impl GameConfig {
    /// Parses a JSON override; unknown or missing fields fall back to defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Stored override if present and valid, defaults otherwise.
    pub fn from_stored(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match Self::from_json(raw) {
            Ok(cfg) => {
                info!(key = CONFIG_STORAGE_KEY, "loaded config override");
                cfg
            }
            Err(err) => {
                warn!(key = CONFIG_STORAGE_KEY, error = %err, "ignoring malformed config override");
                Self::default()
            }
        }
    }

    pub fn pinch_for_frame(&self) -> PinchConfig {
        self.pinch.scaled_to(self.frame)
    }

    pub fn capture_threshold_for_frame(&self) -> f64 {
        self.capture_threshold * self.frame.diagonal()
            / self.pinch.reference_frame.diagonal().max(f64::EPSILON)
    }
}
