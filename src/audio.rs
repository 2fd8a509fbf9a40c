//! Tick tone output
//!
//! The wheel only ever asks for one sound: a short descending tick each time a
//! segment passes the pointer. Output is an injected `ToneSink` so the engine
//! runs headless and tests can count ticks. On the web the tone is synthesized
//! with the Web Audio API - no external files needed.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::AudioError;

/// Fire-and-forget tone output
pub trait ToneSink {
    /// Play one segment tick. Failures are dropped by the caller.
    fn play_tick(&self) -> Result<(), AudioError>;
}

/// Silent sink
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTone;

impl ToneSink for NullTone {
    fn play_tick(&self) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Counts ticks; the counter handle survives boxing the sink
#[derive(Debug, Clone, Default)]
pub struct RecordingTone {
    ticks: Rc<Cell<usize>>,
}

impl RecordingTone {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the tick counter
    pub fn counter(&self) -> Rc<Cell<usize>> {
        self.ticks.clone()
    }
}

impl ToneSink for RecordingTone {
    fn play_tick(&self) -> Result<(), AudioError> {
        self.ticks.set(self.ticks.get() + 1);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::ToneSink;
    use crate::consts::{TICK_DURATION, TICK_FREQ_END, TICK_FREQ_START, TICK_GAIN};
    use crate::error::AudioError;

    /// Web Audio tick generator. Clones share one context.
    #[derive(Clone)]
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl AudioManager {
        pub fn new(volume: f32) -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - ticks disabled");
            }
            Self {
                ctx,
                volume: volume.clamp(0.0, 1.0),
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Result<(OscillatorNode, GainNode), AudioError> {
            let osc = ctx.create_oscillator().map_err(synth_err)?;
            let gain = ctx.create_gain().map_err(synth_err)?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).map_err(synth_err)?;
            gain.connect_with_audio_node(&ctx.destination())
                .map_err(synth_err)?;

            Ok((osc, gain))
        }
    }

    fn synth_err(e: wasm_bindgen::JsValue) -> AudioError {
        AudioError::Synthesis(format!("{:?}", e))
    }

    impl ToneSink for AudioManager {
        /// Tick - short sine sweep 800 Hz down to 400 Hz
        fn play_tick(&self) -> Result<(), AudioError> {
            if self.volume <= 0.0 {
                return Ok(());
            }
            let ctx = self.ctx.as_ref().ok_or(AudioError::Unavailable)?;

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let (osc, gain) = self.create_osc(ctx, TICK_FREQ_START, OscillatorType::Sine)?;
            let t = ctx.current_time();

            gain.gain()
                .set_value_at_time(TICK_GAIN * self.volume, t)
                .map_err(synth_err)?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + TICK_DURATION)
                .map_err(synth_err)?;
            osc.frequency()
                .set_value_at_time(TICK_FREQ_START, t)
                .map_err(synth_err)?;
            osc.frequency()
                .exponential_ramp_to_value_at_time(TICK_FREQ_END, t + TICK_DURATION)
                .map_err(synth_err)?;

            osc.start().map_err(synth_err)?;
            osc.stop_with_when(t + TICK_DURATION).map_err(synth_err)?;
            Ok(())
        }
    }
}
