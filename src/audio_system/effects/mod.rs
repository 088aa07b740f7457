/// Audio effects module
///
/// Per-play variation for one-shot effects and the fade ramps used for music.

pub mod fade;
pub mod pitch;
pub mod variation;

pub use fade::{FadeState, FadeStep, DEFAULT_FADE_SECONDS};
pub use pitch::{change_octave, change_semitone};
pub use variation::RandomRange;

/// Variation applied each time a one-shot effect is played
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectParams {
    /// Channel volume (0.0-1.0)
    pub volume: RandomRange,

    /// Pitch shift in semitones
    pub pitch: RandomRange,
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            volume: RandomRange::fixed(1.0),
            pitch: RandomRange::fixed(0.0),
        }
    }
}

impl EffectParams {
    /// Full volume, no pitch change
    pub fn none() -> Self {
        Self::default()
    }

    /// Set volume range; bounds are clamped to 0.0-1.0
    pub fn with_volume(mut self, min: f32, max: f32) -> Self {
        self.volume = RandomRange::new(min, max).clamped(0.0, 1.0);
        self
    }

    /// Set pitch range in semitones
    pub fn with_pitch(mut self, min_semitones: f32, max_semitones: f32) -> Self {
        self.pitch = RandomRange::new(min_semitones, max_semitones);
        self
    }
}
