/// Sound engine boundary
///
/// The playback manager never decodes or mixes audio itself. Everything it
/// needs from a backend goes through [`SoundEngine`].
use std::path::Path;

use crate::error::AudioError;

/// How a sound is created by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadMode {
    /// Decode while playing instead of up front
    pub streaming: bool,

    /// Restart from the beginning when the end is reached
    pub looping: bool,
}

impl LoadMode {
    /// Fully decoded, plays once
    pub const DEFAULT: LoadMode = LoadMode {
        streaming: false,
        looping: false,
    };

    pub const fn streaming(mut self) -> Self {
        self.streaming = true;
        self
    }

    pub const fn looping(mut self) -> Self {
        self.looping = true;
        self
    }
}

/// Audio backend trait
///
/// Handles are plain values owned by the caller. Channel operations on a
/// channel the engine has already reclaimed fail with
/// [`AudioError::InvalidChannel`].
pub trait SoundEngine {
    /// A created sound, ready to be played any number of times
    type Sound;

    /// A mixing bus routed into the master bus
    type Group: Copy;

    /// One playing instance of a sound
    type Channel: Copy + PartialEq + std::fmt::Debug;

    /// Create a new channel group under the master bus
    fn create_group(&mut self, name: &str) -> Result<Self::Group, AudioError>;

    /// Create a sound from a file path
    fn create_sound(&mut self, path: &Path, mode: LoadMode) -> Result<Self::Sound, AudioError>;

    /// Start a sound on a new channel routed to `group`
    fn play_sound(
        &mut self,
        sound: &Self::Sound,
        group: Self::Group,
        paused: bool,
    ) -> Result<Self::Channel, AudioError>;

    fn channel_volume(&self, channel: Self::Channel) -> Result<f32, AudioError>;

    fn set_channel_volume(&mut self, channel: Self::Channel, volume: f32) -> Result<(), AudioError>;

    /// Playback frequency in Hz
    fn channel_frequency(&self, channel: Self::Channel) -> Result<f32, AudioError>;

    fn set_channel_frequency(&mut self, channel: Self::Channel, frequency: f32) -> Result<(), AudioError>;

    fn set_channel_paused(&mut self, channel: Self::Channel, paused: bool) -> Result<(), AudioError>;

    /// Stop a channel and release it
    fn stop_channel(&mut self, channel: Self::Channel) -> Result<(), AudioError>;

    /// Stop every channel routed to `group`
    fn stop_group(&mut self, group: Self::Group);

    fn group_volume(&self, group: Self::Group) -> f32;

    fn set_group_volume(&mut self, group: Self::Group, volume: f32);

    fn master_volume(&self) -> f32;

    fn set_master_volume(&mut self, volume: f32);

    /// Per-tick housekeeping: reclaims finished channels
    fn update(&mut self);
}
