//! Audio system
//!
//! Sound cues are picked from game events; the browser build synthesizes them
//! with the Web Audio API, so no external files are needed. The background
//! melody is an 8-bit loop stepped by the host clock.

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Unshielded hit - falling crash
    Collision,
    /// Level reached - rising arpeggio
    LevelUp,
    /// Shield raised - electronic chirp
    Shield,
    /// Obstacle absorbed by the shield
    Absorb,
}

impl SoundCue {
    /// Cue for an event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Collision { .. } => Some(SoundCue::Collision),
            GameEvent::LevelUp { .. } => Some(SoundCue::LevelUp),
            GameEvent::ShieldActivated { .. } => Some(SoundCue::Shield),
            GameEvent::ShieldAbsorbed { .. } => Some(SoundCue::Absorb),
            _ => None,
        }
    }
}

/// C4 - C5
const SCALE_HZ: [f32; 8] = [
    261.63, 293.66, 329.63, 349.23, 392.00, 440.00, 493.88, 523.25,
];
/// Indices into `SCALE_HZ`
const MELODY: [usize; 14] = [0, 2, 4, 2, 0, 2, 4, 2, 4, 5, 7, 4, 5, 7];
/// Time between melody notes
pub const MELODY_STEP_MS: u64 = 400;
/// Level-up arpeggio (C-E-G-C)
pub const ARPEGGIO_HZ: [f32; 4] = [261.63, 329.63, 392.00, 523.25];

/// Background melody cursor
#[derive(Debug, Clone, Default)]
pub struct Melody {
    index: usize,
    carry_ms: u64,
}

impl Melody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `dt_ms` and return the notes (Hz) that came due
    pub fn advance(&mut self, dt_ms: u64) -> Vec<f32> {
        self.carry_ms += dt_ms;
        let mut notes = Vec::new();
        while self.carry_ms >= MELODY_STEP_MS {
            self.carry_ms -= MELODY_STEP_MS;
            notes.push(SCALE_HZ[MELODY[self.index % MELODY.len()]]);
            self.index += 1;
        }
        notes
    }

    /// Restart from the first note
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{ARPEGGIO_HZ, SoundCue};
    use crate::settings::Settings;
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        sfx_volume: f32,
        music_volume: f32,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            // Fails outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                sfx_volume: settings.sfx_volume(),
                music_volume: settings.music_volume(),
            }
        }

        /// Pick up toggled settings
        pub fn apply_settings(&mut self, settings: &Settings) {
            self.sfx_volume = settings.sfx_volume();
            self.music_volume = settings.music_volume();
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        fn context(&self) -> Option<&AudioContext> {
            let ctx = self.ctx.as_ref()?;
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            Some(ctx)
        }

        /// Play a sound cue
        pub fn play(&self, cue: SoundCue) {
            let vol = self.sfx_volume;
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = self.context() else { return };

            match cue {
                SoundCue::Collision => self.play_collision(ctx, vol),
                SoundCue::LevelUp => self.play_level_up(ctx, vol),
                SoundCue::Shield => self.play_shield(ctx, vol),
                SoundCue::Absorb => self.play_absorb(ctx, vol),
            }
        }

        /// One melody note
        pub fn play_note(&self, freq: f32) {
            let vol = self.music_volume;
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = self.context() else { return };
            self.play_tone(ctx, freq, vol * 0.3, 0.1, 0.0);
        }

        // === Sound generators ===

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

        /// Square blip with exponential decay
        fn play_tone(&self, ctx: &AudioContext, freq: f32, vol: f32, duration: f64, delay: f64) {
            let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Square) else {
                return;
            };
            let t = ctx.current_time() + delay;
            gain.gain().set_value_at_time(vol, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + duration)
                .ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + duration).ok();
        }

        /// Collision - sawtooth dropping 200 -> 50 Hz
        fn play_collision(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 200.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                .ok();
            osc.frequency().set_value_at_time(200.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(50.0, t + 0.3)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.3).ok();
        }

        /// Level up - C-E-G-C, 100 ms apart
        fn play_level_up(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in ARPEGGIO_HZ.iter().enumerate() {
                self.play_tone(ctx, *freq, vol * 0.2, 0.15, i as f64 * 0.1);
            }
        }

        /// Shield - 800/1200/800 Hz square chirp
        fn play_shield(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 800.0, OscillatorType::Square) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            gain.gain().set_value_at_time(0.01, t + 0.3).ok();
            osc.frequency().set_value_at_time(800.0, t).ok();
            osc.frequency().set_value_at_time(1200.0, t + 0.1).ok();
            osc.frequency().set_value_at_time(800.0, t + 0.2).ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.3).ok();
        }

        /// Absorb - short high ping
        fn play_absorb(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 1200.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.25, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(1800.0, t + 0.1)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_cue_for_event() {
        let hit = GameEvent::Collision {
            id: 1,
            at: Vec2::ZERO,
        };
        assert_eq!(SoundCue::for_event(&hit), Some(SoundCue::Collision));
        assert_eq!(
            SoundCue::for_event(&GameEvent::LevelUp {
                level: 2,
                shield_granted: false
            }),
            Some(SoundCue::LevelUp)
        );
        assert_eq!(
            SoundCue::for_event(&GameEvent::ShieldActivated { charges_left: 0 }),
            Some(SoundCue::Shield)
        );
        assert_eq!(SoundCue::for_event(&GameEvent::Paused), None);
        assert_eq!(
            SoundCue::for_event(&GameEvent::ObstacleSpawned {
                id: 1,
                bouncing: true
            }),
            None
        );
    }

    #[test]
    fn test_melody_steps_on_clock() {
        let mut melody = Melody::new();
        assert!(melody.advance(399).is_empty());
        assert_eq!(melody.advance(1), vec![261.63]);
        // C E G E over the next 1.6 s, with the remainder carried
        assert_eq!(melody.advance(1_650), vec![329.63, 392.00, 329.63, 261.63]);
        assert_eq!(melody.advance(350), vec![329.63]);
    }

    #[test]
    fn test_melody_loops() {
        let mut melody = Melody::new();
        let first = melody.advance(MELODY_STEP_MS * MELODY.len() as u64);
        assert_eq!(first.len(), MELODY.len());
        assert_eq!(melody.advance(MELODY_STEP_MS), vec![SCALE_HZ[0]]);
        melody.reset();
        assert_eq!(melody.advance(MELODY_STEP_MS), vec![SCALE_HZ[0]]);
    }
}
