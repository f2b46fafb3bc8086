//! The puzzle session: phase transitions, the solve clock, and the outbound
//! commands (tones, capture, completion) that adapters carry out.
//!
//! Everything here runs inside the frame callback. Work that must not block
//! the frame loop (image crop/slice, persistence, audio) leaves as a
//! [`SessionCommand`]. Its result comes back through
//! [`PuzzleSession::load_puzzle`].

use rand::Rng;
use tracing::{debug, info, warn};
use web_time::{Duration, Instant};

use super::capture::{CaptureNegotiator, CaptureRect, PixelRect};
use super::drag::{DragController, DragEvent, DragState, HandSignal};
use super::landmark::{FrameSize, HandLandmarks};
use super::pinch::{MAX_HANDS, PinchClassifier};
use crate::config::GameConfig;
use crate::error::ImageError;
use crate::model::{GRID_COLS, GRID_ROWS, GridGeometry, GridModel};
use crate::pixels::PixelBuffer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Capture,
    Solve,
    Complete,
}

impl SessionPhase {
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Capture => "CAPTURE",
            SessionPhase::Solve => "SOLVE",
            SessionPhase::Complete => "COMPLETE",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration_ms: u32,
    pub gain: f32,
    pub delay_ms: u32,
}

impl Tone {
    pub const CAPTURE: Tone = Tone::at(800.0, 100, 0.3, 0);
    pub const GRAB: Tone = Tone::at(600.0, 80, 0.2, 0);
    pub const DROP: Tone = Tone::at(400.0, 60, 0.15, 0);
    pub const COMPLETION_CHIME: [Tone; 3] = [
        Tone::at(400.0, 100, 0.2, 0),
        Tone::at(600.0, 100, 0.2, 120),
        Tone::at(800.0, 200, 0.3, 240),
    ];

    const fn at(frequency_hz: f32, duration_ms: u32, gain: f32, delay_ms: u32) -> Tone {
        Tone {
            frequency_hz,
            duration_ms,
            gain,
            delay_ms,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionCommand {
    PlayTone(Tone),
    /// Crop `rect` from the current frame and hand it back via `load_puzzle`
    /// together with `generation`.
    CaptureRegion { rect: PixelRect, generation: u64 },
    /// Fire-and-forget persistence of a finished puzzle.
    RecordCompletion { seconds: u64 },
}

#[derive(Debug)]
pub struct PuzzleSession {
    config: GameConfig,
    negotiator: CaptureNegotiator,
    phase: SessionPhase,
    generation: u64,
    grid: Option<GridModel>,
    classifier: PinchClassifier,
    drag: DragController,
    preview: Option<CaptureRect>,
    drag_enabled_at: Option<Instant>,
    started_at: Option<Instant>,
    final_seconds: Option<u64>,
}

impl PuzzleSession {
    pub fn new(config: GameConfig) -> Self {
        let negotiator = CaptureNegotiator::new(config.frame, config.capture_threshold_for_frame())
            .with_min_size(GRID_COLS.max(GRID_ROWS));
        let classifier = PinchClassifier::new(config.pinch_for_frame());
        Self {
            config,
            negotiator,
            phase: SessionPhase::Capture,
            generation: 0,
            grid: None,
            classifier,
            drag: DragController::new(),
            preview: None,
            drag_enabled_at: None,
            started_at: None,
            final_seconds: None,
        }
    }

    pub fn frame(&self) -> FrameSize {
        self.config.frame
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn grid(&self) -> Option<&GridModel> {
        self.grid.as_ref()
    }

    pub fn active_drag(&self) -> Option<&DragState> {
        self.drag.active()
    }

    pub fn capture_preview(&self) -> Option<CaptureRect> {
        self.preview
    }

    pub fn drag_enabled(&self, now: Instant) -> bool {
        self.drag_enabled_at.is_some_and(|at| now >= at)
    }

    pub fn elapsed_seconds(&self, now: Instant) -> u64 {
        match (self.phase, self.final_seconds, self.started_at) {
            (SessionPhase::Complete, Some(secs), _) => secs,
            (SessionPhase::Solve, _, Some(start)) => now.saturating_duration_since(start).as_secs(),
            _ => 0,
        }
    }

    /// Processes one frame of hands. Classification, then drag logic, all
    /// against this frame's landmarks.
    pub fn on_frame(&mut self, hands: &[HandLandmarks], now: Instant) -> Vec<SessionCommand> {
        match self.phase {
            SessionPhase::Capture => self.capture_frame(hands, now),
            SessionPhase::Solve => self.solve_frame(hands, now),
            SessionPhase::Complete => Vec::new(),
        }
    }

    fn capture_frame(&mut self, hands: &[HandLandmarks], now: Instant) -> Vec<SessionCommand> {
        let outcome = self.negotiator.evaluate(hands);
        self.preview = outcome.preview;
        let Some(rect) = outcome.fired else {
            return Vec::new();
        };

        self.phase = SessionPhase::Solve;
        self.generation += 1;
        self.preview = None;
        self.classifier.reset();
        self.drag.clear();
        self.drag_enabled_at = Some(now + Duration::from_millis(self.config.grace_period_ms));
        info!(phase = "solve", x = rect.x, y = rect.y, w = rect.width, h = rect.height, "region captured");

        vec![
            SessionCommand::PlayTone(Tone::CAPTURE),
            SessionCommand::CaptureRegion {
                rect,
                generation: self.generation,
            },
        ]
    }

    fn solve_frame(&mut self, hands: &[HandLandmarks], now: Instant) -> Vec<SessionCommand> {
        let mut commands = Vec::new();
        self.drag.enforce_presence(hands.len());

        let enabled = self.drag_enabled(now);
        let frame = self.config.frame;
        for (slot, hand) in hands.iter().enumerate().take(MAX_HANDS) {
            let features = hand.features(frame);
            let pinching = self.classifier.update(slot, features.pinch_distance);

            if !enabled {
                continue;
            }
            let Some(grid) = self.grid.as_mut() else {
                continue;
            };
            let signal = HandSignal {
                slot,
                pinching,
                midpoint: features.midpoint,
            };
            match self.drag.apply(signal, grid) {
                Some(DragEvent::Grabbed { .. }) => commands.push(SessionCommand::PlayTone(Tone::GRAB)),
                Some(DragEvent::Dropped { .. }) => {
                    commands.push(SessionCommand::PlayTone(Tone::DROP));
                    if grid.is_solved() {
                        commands.extend(self.complete(now));
                        break;
                    }
                }
                _ => {}
            }
        }
        commands
    }

    pub(crate) fn complete(&mut self, now: Instant) -> Vec<SessionCommand> {
        let seconds = self.elapsed_seconds(now);
        self.phase = SessionPhase::Complete;
        self.final_seconds = Some(seconds);
        self.drag.clear();
        self.drag_enabled_at = None;
        info!(phase = "complete", seconds, "puzzle solved");

        let mut commands: Vec<SessionCommand> = Tone::COMPLETION_CHIME
            .iter()
            .copied()
            .map(SessionCommand::PlayTone)
            .collect();
        commands.push(SessionCommand::RecordCompletion { seconds });
        commands
    }

    /// Installs the captured image for the capture identified by `generation`:
    /// slices, shuffles and starts the clock. Returns `Ok(false)` when that
    /// capture was superseded by a reset. A slicing failure returns the
    /// session to capture.
    pub fn load_puzzle<R: Rng>(
        &mut self,
        image: &PixelBuffer,
        generation: u64,
        rng: &mut R,
        now: Instant,
    ) -> Result<bool, ImageError> {
        if self.phase != SessionPhase::Solve || generation != self.generation || self.grid.is_some() {
            debug!(generation, current = self.generation, "stale capture discarded");
            return Ok(false);
        }
        let geometry = GridGeometry::centered(self.config.frame, self.config.grid_side);
        let mut grid = match GridModel::initialize(image, geometry) {
            Ok(grid) => grid,
            Err(err) => {
                warn!(error = %err, "captured image could not be sliced");
                self.reset();
                return Err(err);
            }
        };
        grid.shuffle(rng, self.config.shuffle_swaps);
        self.grid = Some(grid);
        self.started_at = Some(now);
        Ok(true)
    }

    /// Gives up on the pending capture `generation` when its pixels could not
    /// be read. Returns whether the session went back to capture.
    pub fn abort_capture(&mut self, generation: u64) -> bool {
        if self.phase != SessionPhase::Solve || generation != self.generation || self.grid.is_some() {
            return false;
        }
        warn!(generation, "capture abandoned");
        self.reset();
        true
    }

    /// Solve -> Capture. Returns whether the transition happened.
    pub fn retake(&mut self) -> bool {
        if self.phase != SessionPhase::Solve {
            return false;
        }
        self.reset();
        true
    }

    /// Complete -> Capture. Returns whether the transition happened.
    pub fn play_again(&mut self) -> bool {
        if self.phase != SessionPhase::Complete {
            return false;
        }
        self.reset();
        true
    }

    fn reset(&mut self) {
        self.phase = SessionPhase::Capture;
        self.generation += 1;
        self.grid = None;
        self.drag.clear();
        self.classifier.reset();
        self.preview = None;
        self.drag_enabled_at = None;
        self.started_at = None;
        self.final_seconds = None;
        info!(phase = "capture", "session reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::landmark::PixelPoint;
    use crate::state::landmark::test_support::hand_at_pixel;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    const PINCH: f64 = 8.0;
    const OPEN: f64 = 90.0;

    fn session() -> PuzzleSession {
        PuzzleSession::new(GameConfig::default())
    }

    fn capture(s: &mut PuzzleSession, now: Instant) -> (PixelRect, u64) {
        let hands = [hand_at_pixel(100.0, 60.0, PINCH), hand_at_pixel(400.0, 360.0, PINCH)];
        let cmds = s.on_frame(&hands, now);
        match cmds.as_slice() {
            [SessionCommand::PlayTone(tone), SessionCommand::CaptureRegion { rect, generation }] => {
                assert_eq!(*tone, Tone::CAPTURE);
                (*rect, *generation)
            }
            other => panic!("unexpected commands {other:?}"),
        }
    }

    fn solving(now: Instant) -> PuzzleSession {
        let mut s = session();
        let (_, generation) = capture(&mut s, now);
        let image = PixelBuffer::solid(300, 300, [200, 40, 40, 255]);
        let mut rng = SmallRng::seed_from_u64(11);
        assert!(s.load_puzzle(&image, generation, &mut rng, now).unwrap());
        s
    }

    fn slot_centre(s: &PuzzleSession, slot: usize) -> PixelPoint {
        let geo = s.grid().unwrap().geometry();
        let o = geo.slot_origin(slot);
        PixelPoint::new(o.x + geo.tile_width / 2.0, o.y + geo.tile_height / 2.0)
    }

    /// Holds one hand at `at` with the given pinch gap for `frames` frames.
    fn hold(s: &mut PuzzleSession, at: PixelPoint, gap: f64, frames: usize, now: Instant) -> Vec<SessionCommand> {
        let mut out = Vec::new();
        for _ in 0..frames {
            out.extend(s.on_frame(&[hand_at_pixel(at.x, at.y, gap)], now));
        }
        out
    }

    #[test]
    fn starts_in_capture() {
        let s = session();
        assert_eq!(s.phase(), SessionPhase::Capture);
        assert!(s.grid().is_none());
        assert_eq!(s.elapsed_seconds(Instant::now()), 0);
    }

    #[test]
    fn preview_without_pinch_does_not_capture() {
        let mut s = session();
        let hands = [hand_at_pixel(100.0, 60.0, OPEN), hand_at_pixel(400.0, 360.0, PINCH)];
        assert!(s.on_frame(&hands, Instant::now()).is_empty());
        assert_eq!(s.phase(), SessionPhase::Capture);
        assert!(s.capture_preview().is_some());
    }

    #[test]
    fn capture_fires_once() {
        let mut s = session();
        let now = Instant::now();
        let (rect, generation) = capture(&mut s, now);
        assert_eq!(s.phase(), SessionPhase::Solve);
        assert_eq!(generation, s.generation);
        assert!(rect.width > 0 && rect.height > 0);
        // same pinch on the next frame is no longer a capture
        let hands = [hand_at_pixel(100.0, 60.0, PINCH), hand_at_pixel(400.0, 360.0, PINCH)];
        let again = s.on_frame(&hands, now);
        assert!(!again.iter().any(|c| matches!(c, SessionCommand::CaptureRegion { .. })));
    }

    #[test]
    fn grace_period_blocks_grabs() {
        let t0 = Instant::now();
        let mut s = solving(t0);
        let at = slot_centre(&s, 4);
        let cmds = hold(&mut s, at, PINCH, 10, t0 + Duration::from_millis(500));
        assert!(cmds.is_empty());
        assert!(s.active_drag().is_none());
        // classifier kept running during the grace period
        assert!(s.classifier.is_pinching(0));

        let cmds = hold(&mut s, at, PINCH, 1, t0 + Duration::from_millis(1000));
        assert_eq!(cmds, vec![SessionCommand::PlayTone(Tone::GRAB)]);
        assert!(s.active_drag().is_some());
    }

    #[test]
    fn stale_load_after_retake_is_discarded() {
        let now = Instant::now();
        let mut s = session();
        let (_, generation) = capture(&mut s, now);
        assert!(s.retake());
        assert_eq!(s.phase(), SessionPhase::Capture);
        let image = PixelBuffer::solid(30, 30, [0, 0, 0, 255]);
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(!s.load_puzzle(&image, generation, &mut rng, now).unwrap());
        assert!(s.grid().is_none());
    }

    #[test]
    fn unsliceable_image_returns_to_capture() {
        let now = Instant::now();
        let mut s = session();
        let (_, generation) = capture(&mut s, now);
        let image = PixelBuffer::solid(2, 2, [0, 0, 0, 255]);
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(s.load_puzzle(&image, generation, &mut rng, now).is_err());
        assert_eq!(s.phase(), SessionPhase::Capture);
    }

    #[test]
    fn unreadable_capture_returns_to_capture() {
        let now = Instant::now();
        let mut s = session();
        let (_, generation) = capture(&mut s, now);
        for _ in 0..30 {
            assert!(s.on_frame(&[], now).is_empty());
        }
        assert_eq!(s.phase(), SessionPhase::Solve);
        assert!(s.grid().is_none());

        assert!(!s.abort_capture(generation + 1));
        assert!(s.abort_capture(generation));
        assert_eq!(s.phase(), SessionPhase::Capture);
        assert_eq!(s.elapsed_seconds(now), 0);
        // a second capture works as usual
        let (_, next) = capture(&mut s, now);
        assert!(next > generation);
    }

    #[test]
    fn abort_is_ignored_once_loaded() {
        let t0 = Instant::now();
        let mut s = solving(t0);
        let generation = s.generation;
        assert!(!s.abort_capture(generation));
        assert_eq!(s.phase(), SessionPhase::Solve);
        assert!(s.grid().is_some());
    }

    #[test]
    fn elapsed_clock_runs_from_load() {
        let t0 = Instant::now();
        let s = solving(t0);
        assert_eq!(s.elapsed_seconds(t0 + Duration::from_millis(2999)), 2);
        assert_eq!(s.elapsed_seconds(t0 + Duration::from_secs(61)), 61);
    }

    #[test]
    fn solving_by_drag_completes_and_freezes_clock() {
        let t0 = Instant::now();
        let mut s = solving(t0);
        let t = t0 + Duration::from_secs(42);

        // Move every misplaced tile home with grab/drag/drop gestures.
        let mut all = Vec::new();
        while s.phase() == SessionPhase::Solve {
            let grid = s.grid().unwrap();
            let (tile, home) = grid
                .tiles()
                .iter()
                .enumerate()
                .find(|(_, t)| t.current_slot != t.correct_slot)
                .map(|(i, t)| (i, t.correct_slot))
                .expect("unsolved grid has a misplaced tile");
            let from = slot_centre(&s, grid.tiles()[tile].current_slot);
            let to = slot_centre(&s, home);

            all.extend(hold(&mut s, from, OPEN, 10, t));
            all.extend(hold(&mut s, from, PINCH, 10, t));
            assert_eq!(s.active_drag().map(|d| d.tile_index), Some(tile));
            all.extend(hold(&mut s, to, PINCH, 1, t));
            all.extend(hold(&mut s, to, OPEN, 10, t));
            if s.phase() == SessionPhase::Solve {
                assert_eq!(s.grid().unwrap().tiles()[tile].current_slot, home);
            }
        }

        assert_eq!(s.phase(), SessionPhase::Complete);
        assert!(all.contains(&SessionCommand::RecordCompletion { seconds: 42 }));
        assert_eq!(s.elapsed_seconds(t + Duration::from_secs(100)), 42);
        assert!(s.on_frame(&[hand_at_pixel(300.0, 200.0, PINCH)], t).is_empty());

        assert!(!s.retake());
        assert!(s.play_again());
        assert_eq!(s.phase(), SessionPhase::Capture);
        assert!(s.grid().is_none());
        assert_eq!(s.elapsed_seconds(t), 0);
    }

    #[test]
    fn completion_emits_chime_then_record() {
        let t0 = Instant::now();
        let mut s = solving(t0);
        let cmds = s.complete(t0 + Duration::from_secs(5));
        assert_eq!(cmds.len(), 4);
        assert_eq!(cmds[0], SessionCommand::PlayTone(Tone::COMPLETION_CHIME[0]));
        assert_eq!(cmds[3], SessionCommand::RecordCompletion { seconds: 5 });
    }

    #[test]
    fn hand_dropout_mid_drag_leaves_grid_untouched() {
        let t0 = Instant::now();
        let mut s = solving(t0);
        let t = t0 + Duration::from_secs(2);
        let before: Vec<usize> = s.grid().unwrap().tiles().iter().map(|t| t.current_slot).collect();

        let from = slot_centre(&s, 0);
        let open_left = hand_at_pixel(40.0, 400.0, OPEN);
        for _ in 0..6 {
            s.on_frame(&[open_left.clone(), hand_at_pixel(from.x, from.y, PINCH)], t);
        }
        assert_eq!(s.active_drag().map(|d| d.owner_slot), Some(1));

        s.on_frame(&[open_left], t);
        assert!(s.active_drag().is_none());
        let after: Vec<usize> = s.grid().unwrap().tiles().iter().map(|t| t.current_slot).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn retake_only_from_solve() {
        let mut s = session();
        assert!(!s.retake());
        assert!(!s.play_again());
        let now = Instant::now();
        capture(&mut s, now);
        assert!(!s.play_again());
        assert!(s.retake());
        assert!(s.active_drag().is_none());
    }
}
