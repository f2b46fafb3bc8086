//! Declarative scene for one frame, and the drawing-surface seam that
//! executes it.
//!
//! `compose` only reads the session and this frame's hands, so the canvas
//! adapter and the tests share the exact same draw order.

use web_time::Instant;

use crate::model::GridModel;
use crate::state::capture::CAPTURE_LABEL;
use crate::state::landmark::{HAND_CONNECTIONS, HandLandmarks, PixelPoint, Space};
use crate::state::session::{PuzzleSession, SessionPhase};
use crate::util::format_clock;

pub const ACCENT: &str = "#00FF00";
pub const TILE_BORDER: &str = "#ffffff";
pub const DOT_OUTLINE: &str = "#FFFFFF";
pub const TIMER_FONT: &str = "14px Space Mono";
pub const LABEL_FONT: &str = "10px Space Mono";

/// The dragged tile is drawn this much larger than a grid cell.
pub const DRAG_SCALE: f64 = 1.1;
pub const TIMER_ANCHOR: PixelPoint = PixelPoint { x: 8.0, y: 22.0 };
const SKELETON_LINE_WIDTH: f64 = 2.0;
const LANDMARK_RADIUS: f64 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// A `width` x `height` rect centred on `centre`.
    pub fn centred(centre: PixelPoint, width: f64, height: f64) -> Self {
        Self::new(centre.x - width / 2.0, centre.y - height / 2.0, width, height)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCmd {
    Clear,
    Frame { mirrored: bool },
    Tile { index: usize, rect: Rect, glow: bool },
    StrokeRect { rect: Rect, color: &'static str, line_width: f64 },
    Text { text: String, at: PixelPoint, color: &'static str, font: &'static str },
    /// 21 landmarks in mirrored pixel space.
    HandSkeleton { points: Vec<PixelPoint> },
}

/// Builds the draw list for the current phase.
pub fn compose(session: &PuzzleSession, hands: &[HandLandmarks], now: Instant) -> Vec<DrawCmd> {
    let mut scene = vec![DrawCmd::Clear, DrawCmd::Frame { mirrored: true }];
    match session.phase() {
        SessionPhase::Capture => {
            push_skeletons(&mut scene, session, hands);
            if let Some(rect) = session.capture_preview() {
                scene.push(DrawCmd::StrokeRect {
                    rect: Rect::new(rect.x, rect.y, rect.width, rect.height),
                    color: ACCENT,
                    line_width: 2.0,
                });
                scene.push(DrawCmd::Text {
                    text: CAPTURE_LABEL.to_string(),
                    at: rect.label_anchor(),
                    color: ACCENT,
                    font: LABEL_FONT,
                });
            }
        }
        SessionPhase::Solve => {
            if let Some(grid) = session.grid() {
                let dragged = session.active_drag().map(|d| d.tile_index);
                push_tiles(&mut scene, grid, dragged);
                if let Some(drag) = session.active_drag() {
                    let geo = grid.geometry();
                    scene.push(DrawCmd::Tile {
                        index: drag.tile_index,
                        rect: Rect::centred(
                            drag.position,
                            geo.tile_width * DRAG_SCALE,
                            geo.tile_height * DRAG_SCALE,
                        ),
                        glow: true,
                    });
                }
            }
            scene.push(DrawCmd::Text {
                text: format_clock(session.elapsed_seconds(now)),
                at: TIMER_ANCHOR,
                color: ACCENT,
                font: TIMER_FONT,
            });
            push_skeletons(&mut scene, session, hands);
        }
        SessionPhase::Complete => push_skeletons(&mut scene, session, hands),
    }
    scene
}

fn push_tiles(scene: &mut Vec<DrawCmd>, grid: &GridModel, skip: Option<usize>) {
    let geo = grid.geometry();
    for (index, tile) in grid.tiles().iter().enumerate() {
        if Some(index) == skip {
            continue;
        }
        let origin = geo.slot_origin(tile.current_slot);
        let rect = Rect::new(origin.x, origin.y, geo.tile_width, geo.tile_height);
        scene.push(DrawCmd::Tile { index, rect, glow: false });
        scene.push(DrawCmd::StrokeRect {
            rect,
            color: TILE_BORDER,
            line_width: 1.0,
        });
    }
}

fn push_skeletons(scene: &mut Vec<DrawCmd>, session: &PuzzleSession, hands: &[HandLandmarks]) {
    let frame = session.frame();
    for hand in hands {
        let points = (0..hand.points().len())
            .map(|i| hand.pixel(i, frame, Space::Mirrored))
            .collect();
        scene.push(DrawCmd::HandSkeleton { points });
    }
}

/// A 2D drawing target. Implementations swallow their own drawing errors.
pub trait Surface {
    /// Whatever the pose provider hands over as the camera image.
    type Frame: ?Sized;

    fn clear(&mut self);
    fn draw_frame(&mut self, frame: &Self::Frame, mirrored: bool);
    /// Draws tile `index` of the currently loaded puzzle into `rect`.
    fn draw_tile(&mut self, index: usize, rect: Rect, glow: bool);
    fn stroke_rect(&mut self, rect: Rect, color: &str, line_width: f64);
    fn fill_text(&mut self, text: &str, at: PixelPoint, color: &str, font: &str);
    fn draw_polyline(&mut self, points: &[PixelPoint], color: &str, line_width: f64);
    fn draw_dot(&mut self, at: PixelPoint, radius: f64, fill: &str, outline: &str);
}

pub fn paint<S: Surface>(surface: &mut S, frame: &S::Frame, scene: &[DrawCmd]) {
    for cmd in scene {
        match cmd {
            DrawCmd::Clear => surface.clear(),
            DrawCmd::Frame { mirrored } => surface.draw_frame(frame, *mirrored),
            DrawCmd::Tile { index, rect, glow } => surface.draw_tile(*index, *rect, *glow),
            DrawCmd::StrokeRect { rect, color, line_width } => {
                surface.stroke_rect(*rect, color, *line_width)
            }
            DrawCmd::Text { text, at, color, font } => surface.fill_text(text, *at, color, font),
            DrawCmd::HandSkeleton { points } => {
                for &(a, b) in HAND_CONNECTIONS.iter() {
                    if let (Some(&pa), Some(&pb)) = (points.get(a), points.get(b)) {
                        surface.draw_polyline(&[pa, pb], ACCENT, SKELETON_LINE_WIDTH);
                    }
                }
                for &p in points {
                    surface.draw_dot(p, LANDMARK_RADIUS, ACCENT, DOT_OUTLINE);
                }
            }
        }
    }
}
