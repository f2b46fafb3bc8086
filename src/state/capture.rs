//! Two-hand capture rectangle negotiation.
//!
//! While capturing, the index fingertips of exactly two hands span a preview
//! rectangle. The capture fires on the first frame where both hands pinch at
//! once. This uses the instantaneous distance, not the debounced classifier.

use serde::{Deserialize, Serialize};

use super::landmark::{FrameSize, HandLandmarks, PixelPoint, Space};

pub const CAPTURE_LABEL: &str = "PINCH TO CAPTURE";

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaptureRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CaptureRect {
    /// Axis-aligned bounding box of two points, independent of their order.
    pub fn spanning(a: PixelPoint, b: PixelPoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Rounds to whole pixels and clamps to the frame. `None` when the result
    /// has no area.
    pub fn to_pixels(&self, frame: FrameSize) -> Option<PixelRect> {
        let left = self.x.round().clamp(0.0, frame.width);
        let top = self.y.round().clamp(0.0, frame.height);
        let right = (self.x + self.width).round().clamp(0.0, frame.width);
        let bottom = (self.y + self.height).round().clamp(0.0, frame.height);
        let width = (right - left) as u32;
        let height = (bottom - top) as u32;
        if width == 0 || height == 0 {
            return None;
        }
        Some(PixelRect {
            x: left as u32,
            y: top as u32,
            width,
            height,
        })
    }

    /// Where the preview label goes: just above the rectangle, never off-screen.
    pub fn label_anchor(&self) -> PixelPoint {
        PixelPoint::new(self.x, (self.y - 6.0).max(10.0))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CaptureOutcome {
    pub preview: Option<CaptureRect>,
    /// Set on the frame the capture fires.
    pub fired: Option<PixelRect>,
}

#[derive(Clone, Copy, Debug)]
pub struct CaptureNegotiator {
    frame: FrameSize,
    threshold: f64,
    min_size: u32,
}

impl CaptureNegotiator {
    pub fn new(frame: FrameSize, threshold: f64) -> Self {
        Self {
            frame,
            threshold,
            min_size: 1,
        }
    }

    /// Rectangles narrower or shorter than `min_size` pixels never fire.
    pub fn with_min_size(mut self, min_size: u32) -> Self {
        self.min_size = min_size.max(1);
        self
    }

    pub fn evaluate(&self, hands: &[HandLandmarks]) -> CaptureOutcome {
        let [first, second] = hands else {
            return CaptureOutcome::default();
        };
        let tip_a = first.features(self.frame).index_tip;
        let tip_b = second.features(self.frame).index_tip;
        let rect = CaptureRect::spanning(tip_a, tip_b);

        let both_pinching = first.pinch_distance(self.frame, Space::Raw) < self.threshold
            && second.pinch_distance(self.frame, Space::Raw) < self.threshold;

        CaptureOutcome {
            preview: Some(rect),
            fired: rect
                .to_pixels(self.frame)
                .filter(|px| both_pinching && px.width >= self.min_size && px.height >= self.min_size),
        }
    }
}
