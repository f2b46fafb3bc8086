use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::warn;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlCanvasElement;
use web_time::Instant;
use yew::prelude::*;

use super::{complete_overlay::CompleteOverlay, mode_panel::ModePanel, retake_button::RetakeButton};
use crate::browser::audio::TonePlayer;
use crate::browser::canvas::CanvasSurface;
use crate::browser::hands::HandsListener;
use crate::config::GameConfig;
use crate::error::BrowserError;
use crate::pixels::PixelBuffer;
use crate::render::{compose, paint};
use crate::state::{HandFrame, PuzzleSession, SessionCommand, SessionPhase};

#[derive(Properties, PartialEq, Clone)]
pub struct PuzzleViewProps {
    pub config: GameConfig,
    /// Leaderboard outcome shown on the completion overlay.
    pub status: Option<String>,
    pub on_complete: Callback<u64>,
    pub on_play_again: Callback<()>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct Hud {
    phase: SessionPhase,
    seconds: u64,
}

impl Hud {
    fn read(session: &PuzzleSession, now: Instant) -> Self {
        Self {
            phase: session.phase(),
            seconds: session.elapsed_seconds(now),
        }
    }
}

/// Everything the hands callback needs, shared with the UI callbacks.
struct Engine {
    session: PuzzleSession,
    surface: Option<CanvasSurface>,
    audio: TonePlayer,
    rng: SmallRng,
}

type SharedEngine = Rc<RefCell<Engine>>;

fn seed() -> u64 {
    let hi = (js_sys::Math::random() * u32::MAX as f64) as u64;
    let lo = (js_sys::Math::random() * u32::MAX as f64) as u64;
    (hi << 32) | lo
}

/// Slices and installs a captured region off the frame callback.
fn load_captured(engine: SharedEngine, pixels: PixelBuffer, generation: u64) {
    spawn_local(async move {
        let mut guard = engine.borrow_mut();
        let Engine { session, surface, rng, .. } = &mut *guard;
        match session.load_puzzle(&pixels, generation, rng, Instant::now()) {
            Ok(true) => {
                if let (Some(surface), Some(grid)) = (surface.as_mut(), session.grid()) {
                    if let Err(err) = surface.load_tiles(grid) {
                        warn!(error = %err, "tile upload failed");
                    }
                }
            }
            Ok(false) => {}
            Err(err) => warn!(error = %err, "capture discarded"),
        }
    });
}

fn on_hands(engine: &SharedEngine, frame: HandFrame<JsValue>, on_complete: &Callback<u64>) {
    let now = Instant::now();
    let commands = engine.borrow_mut().session.on_frame(&frame.hands, now);

    for command in commands {
        match command {
            SessionCommand::PlayTone(tone) => engine.borrow_mut().audio.play(tone),
            SessionCommand::CaptureRegion { rect, generation } => {
                // Pixels must be read now, before the provider reuses the image.
                let grabbed = match &engine.borrow().surface {
                    Some(surface) => surface.grab_region(&frame.image, rect),
                    None => Err(BrowserError::NoContext),
                };
                match grabbed {
                    Ok(pixels) => load_captured(engine.clone(), pixels, generation),
                    Err(err) => {
                        warn!(error = %err, "capture grab failed");
                        engine.borrow_mut().session.abort_capture(generation);
                    }
                }
            }
            SessionCommand::RecordCompletion { seconds } => on_complete.emit(seconds),
        }
    }

    let mut guard = engine.borrow_mut();
    let Engine { session, surface, .. } = &mut *guard;
    if let Some(surface) = surface.as_mut() {
        let scene = compose(session, &frame.hands, now);
        paint(surface, &frame.image, &scene);
    }
}

#[function_component(PuzzleView)]
pub fn puzzle_view(props: &PuzzleViewProps) -> Html {
    let canvas_ref = use_node_ref();
    let engine = {
        let config = props.config.clone();
        use_mut_ref(move || Engine {
            session: PuzzleSession::new(config),
            surface: None,
            audio: TonePlayer::new(),
            rng: SmallRng::seed_from_u64(seed()),
        })
    };
    let hud = use_state(|| Hud {
        phase: SessionPhase::Capture,
        seconds: 0,
    });
    let last_hud = use_mut_ref(|| *hud);
    // Always the latest completion callback; the hands listener outlives renders.
    let on_complete_ref = use_mut_ref(|| props.on_complete.clone());
    *on_complete_ref.borrow_mut() = props.on_complete.clone();

    {
        let canvas_ref = canvas_ref.clone();
        let engine = engine.clone();
        let hud = hud.clone();
        let frame_size = props.config.frame;
        use_effect_with((), move |_| {
            if let Some(canvas) = canvas_ref.cast::<HtmlCanvasElement>() {
                match CanvasSurface::new(&canvas, frame_size) {
                    Ok(surface) => engine.borrow_mut().surface = Some(surface),
                    Err(err) => warn!(error = %err, "canvas unavailable"),
                }
            }

            let listener = {
                let engine = engine.clone();
                HandsListener::attach(move |frame| {
                    let on_complete = on_complete_ref.borrow().clone();
                    on_hands(&engine, frame, &on_complete);
                    let next = Hud::read(&engine.borrow().session, Instant::now());
                    if *last_hud.borrow() != next {
                        *last_hud.borrow_mut() = next;
                        hud.set(next);
                    }
                })
            };
            let listener = match listener {
                Ok(listener) => Some(listener),
                Err(err) => {
                    warn!(error = %err, "hands listener not attached");
                    None
                }
            };
            move || drop(listener)
        });
    }

    let reset_with = |action: fn(&mut PuzzleSession) -> bool| {
        let engine = engine.clone();
        let hud = hud.clone();
        Callback::from(move |_: ()| {
            let mut guard = engine.borrow_mut();
            if action(&mut guard.session) {
                if let Some(surface) = guard.surface.as_mut() {
                    surface.unload_tiles();
                }
                hud.set(Hud::read(&guard.session, Instant::now()));
            }
        })
    };
    let on_retake = reset_with(PuzzleSession::retake);
    let on_play_again = {
        let play_again = reset_with(PuzzleSession::play_again);
        let notify = props.on_play_again.clone();
        Callback::from(move |_| {
            play_again.emit(());
            notify.emit(());
        })
    };

    html! {
        <div style="position:relative; width:640px; height:480px; margin:0 auto; background:#000; overflow:hidden;">
            <canvas ref={canvas_ref} style="display:block; width:640px; height:480px;" />
            <ModePanel phase={hud.phase} seconds={hud.seconds} />
            <RetakeButton show={hud.phase == SessionPhase::Solve} on_retake={on_retake} />
            <CompleteOverlay
                show={hud.phase == SessionPhase::Complete}
                seconds={hud.seconds}
                status={props.status.clone()}
                play_again={on_play_again}
            />
        </div>
    }
}
