//! Normalized hand landmarks and the pixel-space features derived from them.
//!
//! The pose stream is not mirrored but the displayed feed is, so anything
//! compared against on-screen geometry must use [`Space::Mirrored`].

use serde::{Deserialize, Serialize};

pub const LANDMARK_COUNT: usize = 21;
pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;

/// Bone pairs of the 21-point hand model, used for skeleton overlays.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (5, 9), (9, 10), (10, 11), (11, 12),
    (9, 13), (13, 14), (14, 15), (15, 16),
    (13, 17), (0, 17), (17, 18), (18, 19), (19, 20),
];

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: f64,
    pub height: f64,
}

impl FrameSize {
    pub const REFERENCE: FrameSize = FrameSize { width: 640.0, height: 480.0 };

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn diagonal(&self) -> f64 {
        (self.width * self.width + self.height * self.height).sqrt()
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// A landmark in normalized `[0, 1]` image coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NormPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: PixelPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: PixelPoint) -> PixelPoint {
        PixelPoint::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Space {
    Raw,
    Mirrored,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    points: [NormPoint; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [NormPoint; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Builds a landmark set from a decoded list; `None` unless exactly 21 points.
    pub fn from_slice(points: &[NormPoint]) -> Option<Self> {
        let points: [NormPoint; LANDMARK_COUNT] = points.try_into().ok()?;
        Some(Self { points })
    }

    pub fn points(&self) -> &[NormPoint; LANDMARK_COUNT] {
        &self.points
    }

    /// Pixel position of landmark `index`. Panics on an index >= 21.
    pub fn pixel(&self, index: usize, frame: FrameSize, space: Space) -> PixelPoint {
        let p = self.points[index];
        let x = p.x * frame.width;
        let y = p.y * frame.height;
        match space {
            Space::Raw => PixelPoint::new(x, y),
            Space::Mirrored => PixelPoint::new(frame.width - x, y),
        }
    }

    pub fn pinch_distance(&self, frame: FrameSize, space: Space) -> f64 {
        self.pixel(INDEX_TIP, frame, space)
            .distance(self.pixel(THUMB_TIP, frame, space))
    }

    pub fn pinch_midpoint(&self, frame: FrameSize, space: Space) -> PixelPoint {
        self.pixel(INDEX_TIP, frame, space)
            .midpoint(self.pixel(THUMB_TIP, frame, space))
    }

    pub fn features(&self, frame: FrameSize) -> HandFeatures {
        HandFeatures {
            pinch_distance: self.pinch_distance(frame, Space::Mirrored),
            midpoint: self.pinch_midpoint(frame, Space::Mirrored),
            index_tip: self.pixel(INDEX_TIP, frame, Space::Mirrored),
        }
    }
}

/// Per-hand geometry in mirrored pixel space, computed once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandFeatures {
    pub pinch_distance: f64,
    pub midpoint: PixelPoint,
    pub index_tip: PixelPoint,
}

/// One pose-provider callback: hands in positional order plus the frame image.
/// A hand's index is its slot for this frame only.
#[derive(Clone, Debug)]
pub struct HandFrame<I> {
    pub image: I,
    pub hands: Vec<HandLandmarks>,
}

impl<I> HandFrame<I> {
    pub fn new(image: I, hands: Vec<HandLandmarks>) -> Self {
        Self { image, hands }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A hand whose index tip and thumb tip sit at the given normalized positions.
    pub fn hand_with_tips(index: (f64, f64), thumb: (f64, f64)) -> HandLandmarks {
        let mut points = [NormPoint { x: 0.5, y: 0.5 }; LANDMARK_COUNT];
        points[INDEX_TIP] = NormPoint { x: index.0, y: index.1 };
        points[THUMB_TIP] = NormPoint { x: thumb.0, y: thumb.1 };
        HandLandmarks::new(points)
    }

    /// A hand pinching (or not) around a mirrored pixel position in the reference frame.
    pub fn hand_at_pixel(x: f64, y: f64, gap_px: f64) -> HandLandmarks {
        let frame = FrameSize::REFERENCE;
        // mirrored x -> raw normalized x
        let raw_x = (frame.width - x) / frame.width;
        let half = gap_px / 2.0 / frame.width;
        hand_with_tips((raw_x - half, y / frame.height), (raw_x + half, y / frame.height))
    }
}
