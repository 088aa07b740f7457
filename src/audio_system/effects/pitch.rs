/// Pitch shifting by frequency ratio

/// Frequency ratio of one octave
const OCTAVE_RATIO: f32 = 2.0;

/// Shift `frequency` by `octaves` (may be fractional or negative)
pub fn change_octave(frequency: f32, octaves: f32) -> f32 {
    frequency * OCTAVE_RATIO.powf(octaves)
}

/// Shift `frequency` by `semitones` (may be fractional or negative)
pub fn change_semitone(frequency: f32, semitones: f32) -> f32 {
    change_octave(frequency, semitones / 12.0)
}
