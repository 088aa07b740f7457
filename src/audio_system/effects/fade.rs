/// Music fade state machine
///
/// Linear volume ramps applied to the active music channel.

/// Fade duration used when no configuration overrides it
pub const DEFAULT_FADE_SECONDS: f32 = 1.0;

/// Fade state of the active music channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FadeState {
    /// Holding steady
    #[default]
    None,

    /// Ramping towards full volume
    FadeIn,

    /// Ramping towards silence, then stop
    FadeOut,
}

/// Result of advancing a fade by one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeStep {
    /// No fade in progress
    Idle,

    /// Still ramping; apply this volume
    Ramping(f32),

    /// Ramp complete; the final volume is exactly 1.0 (in) or 0.0 (out)
    Finished(f32),
}

impl FadeState {
    /// Advance a fade from `volume` by `elapsed` seconds over a ramp of
    /// `fade_seconds` for the full 0..1 range.
    pub fn step(self, volume: f32, elapsed: f32, fade_seconds: f32) -> FadeStep {
        let elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };
        let delta = if fade_seconds > 0.0 {
            elapsed / fade_seconds
        } else {
            f32::INFINITY
        };

        match self {
            FadeState::None => FadeStep::Idle,
            FadeState::FadeIn => {
                let next = volume + delta;
                if next >= 1.0 {
                    FadeStep::Finished(1.0)
                } else {
                    FadeStep::Ramping(next.max(0.0))
                }
            }
            FadeState::FadeOut => {
                let next = volume - delta;
                if next <= 0.0 {
                    FadeStep::Finished(0.0)
                } else {
                    FadeStep::Ramping(next.min(1.0))
                }
            }
        }
    }

    pub fn is_fading(self) -> bool {
        self != FadeState::None
    }
}
