use tracing::warn;
use web_sys::{AudioContext, OscillatorType};

use crate::error::BrowserError;
use crate::state::session::Tone;

/// Sine-wave cue player. The context is created on first use because
/// browsers refuse audio before a user gesture.
#[derive(Default)]
pub struct TonePlayer {
    ctx: Option<AudioContext>,
}

impl TonePlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire-and-forget; failures are logged and otherwise ignored.
    pub fn play(&mut self, tone: Tone) {
        if let Err(err) = self.try_play(tone) {
            warn!(error = %err, hz = tone.frequency_hz, "tone playback failed");
        }
    }

    fn context(&mut self) -> Result<&AudioContext, BrowserError> {
        if self.ctx.is_none() {
            self.ctx = Some(AudioContext::new()?);
        }
        self.ctx.as_ref().ok_or(BrowserError::NoContext)
    }

    fn try_play(&mut self, tone: Tone) -> Result<(), BrowserError> {
        let ctx = self.context()?;
        let start = ctx.current_time() + f64::from(tone.delay_ms) / 1000.0;
        let end = start + f64::from(tone.duration_ms) / 1000.0;

        let osc = ctx.create_oscillator()?;
        osc.set_type(OscillatorType::Sine);
        osc.frequency().set_value(tone.frequency_hz);

        let gain = ctx.create_gain()?;
        gain.gain().set_value_at_time(tone.gain, start)?;
        gain.gain().exponential_ramp_to_value_at_time(0.001, end)?;

        osc.connect_with_audio_node(&gain)?;
        gain.connect_with_audio_node(&ctx.destination())?;
        osc.start_with_when(start)?;
        osc.stop_with_when(end)?;
        Ok(())
    }
}
