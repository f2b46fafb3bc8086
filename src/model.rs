//! Puzzle board model: tile geometry, the slot permutation, shuffling and
//! the solved check.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ImageError;
use crate::pixels::PixelBuffer;
use crate::state::landmark::{FrameSize, PixelPoint};

pub const GRID_COLS: u32 = 3;
pub const GRID_ROWS: u32 = 3;
pub const TILE_COUNT: usize = (GRID_COLS * GRID_ROWS) as usize;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    pub origin_x: f64,
    pub origin_y: f64,
    pub width: f64,
    pub height: f64,
    pub tile_width: f64,
    pub tile_height: f64,
}

impl GridGeometry {
    /// A square board of `side` pixels centred horizontally, top-aligned,
    /// clamped to the frame height.
    pub fn centered(frame: FrameSize, side: f64) -> Self {
        let side = side.min(frame.height).min(frame.width).max(0.0);
        Self {
            origin_x: (frame.width - side) / 2.0,
            origin_y: 0.0,
            width: side,
            height: side,
            tile_width: side / GRID_COLS as f64,
            tile_height: side / GRID_ROWS as f64,
        }
    }

    /// Grid slot under a pixel, or `None` outside the board.
    pub fn slot_at(&self, point: PixelPoint) -> Option<usize> {
        if self.tile_width <= 0.0 || self.tile_height <= 0.0 {
            return None;
        }
        let col = ((point.x - self.origin_x) / self.tile_width).floor();
        let row = ((point.y - self.origin_y) / self.tile_height).floor();
        if col < 0.0 || row < 0.0 || col >= GRID_COLS as f64 || row >= GRID_ROWS as f64 {
            return None;
        }
        Some(row as usize * GRID_COLS as usize + col as usize)
    }

    /// Top-left corner of `slot` in frame pixels.
    pub fn slot_origin(&self, slot: usize) -> PixelPoint {
        let col = (slot % GRID_COLS as usize) as f64;
        let row = (slot / GRID_COLS as usize) as f64;
        PixelPoint::new(
            self.origin_x + col * self.tile_width,
            self.origin_y + row * self.tile_height,
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub correct_slot: usize,
    pub current_slot: usize,
    pub image: PixelBuffer,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GridModel {
    geometry: GridGeometry,
    tiles: Vec<Tile>,
}

impl GridModel {
    /// Slices `image` row-major into nine tiles, each starting in its correct slot.
    pub fn initialize(image: &PixelBuffer, geometry: GridGeometry) -> Result<Self, ImageError> {
        let tiles = image
            .slice_grid(GRID_COLS, GRID_ROWS)?
            .into_iter()
            .enumerate()
            .map(|(i, image)| Tile {
                correct_slot: i,
                current_slot: i,
                image,
            })
            .collect();
        Ok(Self { geometry, tiles })
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Applies `count` uniformly random pair swaps (self-swaps included) and
    /// returns the swaps in the order they were applied.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R, count: u32) -> Vec<(usize, usize)> {
        let mut log = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let a = rng.random_range(0..self.tiles.len());
            let b = rng.random_range(0..self.tiles.len());
            self.swap(a, b);
            log.push((a, b));
        }
        debug_assert!(self.is_permutation());
        debug!(swaps = count, solved = self.is_solved(), "grid shuffled");
        log
    }

    /// Index into `tiles()` of the tile occupying `slot`.
    pub fn tile_in_slot(&self, slot: usize) -> Option<usize> {
        self.tiles.iter().position(|t| t.current_slot == slot)
    }

    /// Hit-tests a frame pixel to the tile drawn there.
    pub fn tile_at(&self, point: PixelPoint) -> Option<usize> {
        self.geometry
            .slot_at(point)
            .and_then(|slot| self.tile_in_slot(slot))
    }

    /// Exchanges the slots of two tiles. Out-of-range indices are ignored.
    pub fn swap(&mut self, a: usize, b: usize) {
        if a == b || a >= self.tiles.len() || b >= self.tiles.len() {
            return;
        }
        let tmp = self.tiles[a].current_slot;
        self.tiles[a].current_slot = self.tiles[b].current_slot;
        self.tiles[b].current_slot = tmp;
    }

    pub fn is_solved(&self) -> bool {
        self.tiles.iter().all(|t| t.correct_slot == t.current_slot)
    }

    pub fn is_permutation(&self) -> bool {
        let mut seen = [false; TILE_COUNT];
        self.tiles.len() == TILE_COUNT
            && self.tiles.iter().all(|t| {
                t.current_slot < TILE_COUNT && !std::mem::replace(&mut seen[t.current_slot], true)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn grid() -> GridModel {
        let image = PixelBuffer::solid(300, 300, [40, 200, 40, 255]);
        GridModel::initialize(&image, GridGeometry::centered(FrameSize::REFERENCE, 480.0)).unwrap()
    }

    #[test]
    fn initialize_is_solved_and_row_major() {
        let g = grid();
        assert_eq!(g.tiles().len(), TILE_COUNT);
        assert!(g.is_solved());
        for (i, t) in g.tiles().iter().enumerate() {
            assert_eq!((t.correct_slot, t.current_slot), (i, i));
            assert_eq!((t.image.width(), t.image.height()), (100, 100));
        }
    }

    #[test]
    fn geometry_centres_board_in_reference_frame() {
        let geo = GridGeometry::centered(FrameSize::REFERENCE, 480.0);
        assert_eq!(geo.origin_x, 80.0);
        assert_eq!(geo.tile_width, 160.0);
        assert_eq!(geo.slot_origin(5), PixelPoint::new(400.0, 160.0));
    }

    #[test]
    fn slot_at_handles_edges() {
        let geo = GridGeometry::centered(FrameSize::REFERENCE, 480.0);
        assert_eq!(geo.slot_at(PixelPoint::new(80.0, 0.0)), Some(0));
        assert_eq!(geo.slot_at(PixelPoint::new(559.9, 479.9)), Some(8));
        assert_eq!(geo.slot_at(PixelPoint::new(79.9, 10.0)), None);
        assert_eq!(geo.slot_at(PixelPoint::new(560.0, 10.0)), None);
        assert_eq!(geo.slot_at(PixelPoint::new(300.0, 480.0)), None);
        assert_eq!(geo.slot_at(PixelPoint::new(300.0, -1.0)), None);
    }

    #[test]
    fn tile_at_follows_current_slot() {
        let mut g = grid();
        g.swap(0, 4);
        let centre = PixelPoint::new(320.0, 240.0);
        assert_eq!(g.tile_at(centre), Some(0));
        assert_eq!(g.tile_at(PixelPoint::new(100.0, 20.0)), Some(4));
    }

    #[test]
    fn one_swap_unsolves() {
        let mut g = grid();
        g.swap(2, 7);
        assert!(!g.is_solved());
        g.swap(7, 2);
        assert!(g.is_solved());
    }

    #[test]
    fn self_swap_is_noop() {
        let mut g = grid();
        g.swap(3, 3);
        g.swap(3, 99);
        assert!(g.is_solved());
    }

    #[test]
    fn shuffle_logs_every_swap() {
        let mut g = grid();
        let mut rng = SmallRng::seed_from_u64(7);
        let log = g.shuffle(&mut rng, 200);
        assert_eq!(log.len(), 200);
        assert!(g.is_permutation());
    }

    #[test]
    fn reversing_the_shuffle_solves_the_grid() {
        let mut g = grid();
        let mut rng = SmallRng::seed_from_u64(0xC0FFEE);
        let log = g.shuffle(&mut rng, 200);
        for &(a, b) in log.iter().rev() {
            g.swap(a, b);
        }
        assert!(g.is_solved());
    }

    proptest! {
        #[test]
        fn shuffle_preserves_permutation(seed in any::<u64>(), count in 0u32..500) {
            let mut g = grid();
            let mut rng = SmallRng::seed_from_u64(seed);
            g.shuffle(&mut rng, count);
            prop_assert!(g.is_permutation());
        }

        #[test]
        fn arbitrary_swaps_preserve_permutation(swaps in prop::collection::vec((0usize..12, 0usize..12), 0..64)) {
            let mut g = grid();
            for (a, b) in swaps {
                g.swap(a, b);
            }
            prop_assert!(g.is_permutation());
        }
    }
}
