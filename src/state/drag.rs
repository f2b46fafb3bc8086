//! Pinch-drag tile manipulation.
//!
//! At most one drag exists at a time and it belongs to a single hand slot.
//! Only the owner can move or drop it. A drag whose owner disappears is
//! abandoned without touching the grid.

use tracing::debug;

use super::landmark::PixelPoint;
use crate::model::GridModel;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragState {
    pub tile_index: usize,
    pub position: PixelPoint,
    pub owner_slot: usize,
}

/// Confirmed pinch signal and pinch midpoint for one hand slot this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandSignal {
    pub slot: usize,
    pub pinching: bool,
    pub midpoint: PixelPoint,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragEvent {
    Grabbed { tile: usize, slot: usize },
    Dropped { tile: usize, onto: usize },
    /// Released over nothing, or over the tile's own slot.
    Returned { tile: usize },
    /// Owner hand vanished; the grid is unchanged.
    Abandoned { tile: usize },
}

#[derive(Clone, Debug, Default)]
pub struct DragController {
    active: Option<DragState>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&DragState> {
        self.active.as_ref()
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    /// Clears a drag whose owner is no longer in the frame. Must run every
    /// frame before [`apply`](Self::apply), even when input is gated.
    pub fn enforce_presence(&mut self, hand_count: usize) -> Option<DragEvent> {
        let drag = self.active?;
        if hand_count == 0 || drag.owner_slot >= hand_count {
            self.active = None;
            debug!(tile = drag.tile_index, slot = drag.owner_slot, hand_count, "drag abandoned");
            return Some(DragEvent::Abandoned { tile: drag.tile_index });
        }
        None
    }

    /// Runs the grab/move/drop protocol for one hand's signal.
    pub fn apply(&mut self, signal: HandSignal, grid: &mut GridModel) -> Option<DragEvent> {
        match self.active {
            None if signal.pinching => {
                let tile = grid.tile_at(signal.midpoint)?;
                self.active = Some(DragState {
                    tile_index: tile,
                    position: signal.midpoint,
                    owner_slot: signal.slot,
                });
                debug!(tile, slot = signal.slot, "tile grabbed");
                Some(DragEvent::Grabbed { tile, slot: signal.slot })
            }
            None => None,
            Some(ref mut drag) if drag.owner_slot == signal.slot => {
                if signal.pinching {
                    drag.position = signal.midpoint;
                    return None;
                }
                let drag = *drag;
                self.active = None;
                match grid.tile_at(drag.position) {
                    Some(target) if target != drag.tile_index => {
                        grid.swap(drag.tile_index, target);
                        debug!(tile = drag.tile_index, onto = target, "tile dropped");
                        Some(DragEvent::Dropped { tile: drag.tile_index, onto: target })
                    }
                    _ => Some(DragEvent::Returned { tile: drag.tile_index }),
                }
            }
            Some(_) => None,
        }
    }
}
