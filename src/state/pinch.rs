//! Per-hand pinch classification: smoothing, hysteresis, then debounce.
//!
//! State is keyed by hand slot (position in the frame's hand list), not by a
//! tracked hand identity. If two hands swap order between frames their
//! smoothed distances and counters swap owners too.

use tracing::debug;

use crate::config::PinchConfig;

/// Hand slots that take part in gameplay; hands beyond this are ignored.
pub const MAX_HANDS: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchTrack {
    pub smoothed_distance: f64,
    pub is_pinching: bool,
    pub confirm_counter: u32,
}

impl PinchTrack {
    fn seeded(raw_distance: f64) -> Self {
        Self {
            smoothed_distance: raw_distance,
            is_pinching: false,
            confirm_counter: 0,
        }
    }

    fn update(&mut self, raw_distance: f64, config: &PinchConfig) -> bool {
        let alpha = config.smoothing_alpha;
        self.smoothed_distance = (1.0 - alpha) * self.smoothed_distance + alpha * raw_distance;

        let raw_signal = if self.is_pinching {
            self.smoothed_distance < config.release_threshold
        } else {
            self.smoothed_distance < config.grab_threshold
        };

        if raw_signal == self.is_pinching {
            self.confirm_counter = 0;
        } else {
            self.confirm_counter += 1;
            if self.confirm_counter >= config.confirm_frames {
                self.is_pinching = raw_signal;
                self.confirm_counter = 0;
            }
        }
        self.is_pinching
    }
}

#[derive(Clone, Debug)]
pub struct PinchClassifier {
    config: PinchConfig,
    slots: [Option<PinchTrack>; MAX_HANDS],
}

impl PinchClassifier {
    pub fn new(config: PinchConfig) -> Self {
        Self {
            config,
            slots: [None; MAX_HANDS],
        }
    }

    /// Feeds one frame's raw pinch distance for `slot` and returns the
    /// confirmed pinch state. Slots outside `MAX_HANDS` always read `false`.
    pub fn update(&mut self, slot: usize, raw_distance: f64) -> bool {
        let Some(entry) = self.slots.get_mut(slot) else {
            return false;
        };
        let track = entry.get_or_insert_with(|| PinchTrack::seeded(raw_distance));
        let before = track.is_pinching;
        let now = track.update(raw_distance, &self.config);
        if before != now {
            debug!(slot, pinching = now, smoothed = track.smoothed_distance, "pinch state confirmed");
        }
        now
    }

    #[cfg(test)]
    pub fn track(&self, slot: usize) -> Option<&PinchTrack> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    #[cfg(test)]
    pub fn is_pinching(&self, slot: usize) -> bool {
        self.track(slot).is_some_and(|t| t.is_pinching)
    }

    pub fn reset(&mut self) {
        self.slots = [None; MAX_HANDS];
    }
}
