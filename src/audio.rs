//! Sound effects
//!
//! The simulation only emits [`GameEvent`]s. The session maps them to
//! [`SoundEffect`]s and fires them into an [`AudioSink`]; nothing flows back.
//! On the web the sink is a Web Audio synthesizer, procedurally generated so
//! no asset files are needed.

use std::cell::RefCell;
use std::rc::Rc;

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Wing flap
    Jump,
    /// Point earned
    Score,
    /// Collision
    Hit,
    /// Falls after `Hit`
    Death,
    /// New run
    Restart,
}

impl SoundEffect {
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Jump => "jump",
            SoundEffect::Score => "score",
            SoundEffect::Hit => "hit",
            SoundEffect::Death => "death",
            SoundEffect::Restart => "restart",
        }
    }

    /// Sound for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Jumped => Some(SoundEffect::Jump),
            GameEvent::Scored { .. } => Some(SoundEffect::Score),
            GameEvent::Hit { .. } => Some(SoundEffect::Hit),
            GameEvent::Died => Some(SoundEffect::Death),
            GameEvent::Restarted => Some(SoundEffect::Restart),
            GameEvent::RunEnded { .. } => None,
        }
    }
}

/// Fire-and-forget sound output
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);

    /// Apply a new effective volume (0.0 - 1.0)
    fn set_volume(&mut self, _volume: f32) {}

    /// Unlock output after a user gesture
    fn resume(&mut self) {}
}

/// Sink that drops everything (native builds)
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect) {}
}

/// Sink that remembers what was played; clones share one log
#[derive(Debug, Default, Clone)]
pub struct RecordingAudio {
    played: Rc<RefCell<Vec<SoundEffect>>>,
}

impl RecordingAudio {
    pub fn played(&self) -> Vec<SoundEffect> {
        self.played.borrow().clone()
    }

    pub fn clear(&self) {
        self.played.borrow_mut().clear();
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, effect: SoundEffect) {
        self.played.borrow_mut().push(effect);
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundEffect};

    /// Web Audio synthesizer
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl AudioManager {
        pub fn new(volume: f32) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: volume.clamp(0.0, 1.0),
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Pitch sweep from `from` to `to` Hz over `duration` seconds
        fn sweep(
            &self,
            ctx: &AudioContext,
            osc_type: OscillatorType,
            from: f32,
            to: f32,
            duration: f64,
            level: f32,
        ) {
            let Some((osc, gain)) = self.create_osc(ctx, from, osc_type) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(self.volume * level, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + duration)
                .ok();
            osc.frequency().set_value_at_time(from, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(to, t + duration)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + duration + 0.05).ok();
        }
    }

    impl AudioSink for AudioManager {
        fn play(&mut self, effect: SoundEffect) {
            if self.volume <= 0.0 {
                return;
            }
            let Some(ctx) = self.ctx.clone() else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Jump => self.sweep(&ctx, OscillatorType::Triangle, 300.0, 600.0, 0.1, 0.4),
                SoundEffect::Score => self.sweep(&ctx, OscillatorType::Sine, 880.0, 1320.0, 0.15, 0.35),
                SoundEffect::Hit => self.sweep(&ctx, OscillatorType::Square, 200.0, 80.0, 0.12, 0.3),
                SoundEffect::Death => self.sweep(&ctx, OscillatorType::Sawtooth, 400.0, 60.0, 0.5, 0.3),
                SoundEffect::Restart => self.sweep(&ctx, OscillatorType::Sine, 200.0, 900.0, 0.2, 0.25),
            }
        }

        fn set_volume(&mut self, volume: f32) {
            self.volume = volume.clamp(0.0, 1.0);
        }

        /// Resume audio context (required after user gesture)
        fn resume(&mut self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{DeathCause, RunSummary, ScoreSource};

    #[test]
    fn test_event_mapping() {
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Jumped),
            Some(SoundEffect::Jump)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Scored {
                source: ScoreSource::Collectible
            }),
            Some(SoundEffect::Score)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Hit {
                cause: DeathCause::Tower
            }),
            Some(SoundEffect::Hit)
        );
        assert_eq!(SoundEffect::for_event(&GameEvent::Died), Some(SoundEffect::Death));
        let summary = RunSummary {
            score: 0,
            obstacles_passed: 0,
            collectibles: 0,
            jumps: 0,
            play_time_ms: 0.0,
        };
        assert_eq!(SoundEffect::for_event(&GameEvent::RunEnded { summary }), None);
    }

    #[test]
    fn test_recording_sink() {
        let sink = RecordingAudio::default();
        let mut handle = sink.clone();
        handle.play(SoundEffect::Restart);
        assert_eq!(sink.played(), vec![SoundEffect::Restart]);
        sink.clear();
        assert!(sink.played().is_empty());
        assert_eq!(SoundEffect::Restart.name(), "restart");
    }
}
