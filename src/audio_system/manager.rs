/// Playback manager
///
/// Owns the sound engine, one asset map and channel group per category, and
/// the single music slot with its fade state machine.

use std::collections::HashMap;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::AudioConfig;
use crate::error::AudioError;

use super::category::SoundCategory;
use super::effects::{change_semitone, EffectParams, FadeState, FadeStep, DEFAULT_FADE_SECONDS};
use super::engine::SoundEngine;

/// The music track currently owning the music group
#[derive(Debug)]
struct ActiveMusic<C> {
    path: String,
    channel: C,
    fade: FadeState,
}

/// Playback manager
///
/// Single-threaded and tick-driven: call [`update`](Self::update) once per
/// frame from the thread that owns the manager.
pub struct PlaybackManager<E: SoundEngine, R: Rng = StdRng> {
    engine: E,
    groups: [E::Group; SoundCategory::COUNT],
    sounds: [HashMap<String, E::Sound>; SoundCategory::COUNT],
    music: Option<ActiveMusic<E::Channel>>,
    next_music: Option<String>,
    fade_seconds: f32,
    rng: R,
}

impl<E: SoundEngine> PlaybackManager<E, StdRng> {
    /// Create a manager on top of `engine`, seeding variation from the OS
    pub fn new(engine: E) -> Result<Self, AudioError> {
        Self::with_rng(engine, StdRng::from_entropy())
    }
}

impl<E: SoundEngine, R: Rng> PlaybackManager<E, R> {
    /// Create a manager with an explicit random source
    pub fn with_rng(mut engine: E, rng: R) -> Result<Self, AudioError> {
        let groups = [
            engine.create_group("effects")?,
            engine.create_group("music")?,
        ];

        Ok(Self {
            engine,
            groups,
            sounds: [HashMap::new(), HashMap::new()],
            music: None,
            next_music: None,
            fade_seconds: DEFAULT_FADE_SECONDS,
            rng,
        })
    }

    /// Apply volumes and fade duration from configuration
    pub fn apply_config(&mut self, config: &AudioConfig) {
        self.set_master_volume(config.master_volume);
        self.set_effects_volume(config.effects_volume);
        self.set_music_volume(config.music_volume);
        self.set_fade_seconds(config.fade_seconds);
    }

    /// Load a one-shot effect (no-op if already loaded)
    pub fn load_effect(&mut self, path: &str) -> Result<(), AudioError> {
        self.load(SoundCategory::Effects, path)
    }

    /// Load a music track for streaming (no-op if already loaded)
    pub fn load_music(&mut self, path: &str) -> Result<(), AudioError> {
        self.load(SoundCategory::Music, path)
    }

    fn load(&mut self, category: SoundCategory, path: &str) -> Result<(), AudioError> {
        if self.sounds[category.index()].contains_key(path) {
            tracing::debug!("{} already loaded: {}", category, path);
            return Ok(());
        }

        let sound = self
            .engine
            .create_sound(Path::new(path), category.load_mode())?;
        self.sounds[category.index()].insert(path.to_string(), sound);

        tracing::info!("Loaded {} sound: {}", category, path);
        Ok(())
    }

    /// Play a loaded effect with randomized volume and pitch
    ///
    /// Unknown paths are ignored, as are engine failures while starting the
    /// sound.
    pub fn play_effect(&mut self, path: &str, params: EffectParams) {
        let Some(sound) = self.sounds[SoundCategory::Effects.index()].get(path) else {
            tracing::debug!("Effect not loaded, ignoring: {}", path);
            return;
        };

        let volume = params.volume.sample(&mut self.rng);
        let pitch = params.pitch.sample(&mut self.rng);
        let group = self.groups[SoundCategory::Effects.index()];

        match start_effect(&mut self.engine, sound, group, volume, pitch) {
            Ok(()) => tracing::trace!(
                "Effect {} (volume {:.2}, pitch {:+.2} st)",
                path,
                volume,
                pitch
            ),
            Err(e) => tracing::warn!("Failed to play effect {}: {}", path, e),
        }
    }

    /// Stop every playing effect
    pub fn stop_effects(&mut self) {
        self.engine.stop_group(self.groups[SoundCategory::Effects.index()]);
        tracing::debug!("Stopped all effects");
    }

    /// Switch music to `path`
    ///
    /// The active track (even one fading out) is left alone. A different
    /// track fades the current one out first and starts once the fade
    /// completes.
    pub fn play_music(&mut self, path: &str) {
        if let Some(music) = self.music.as_mut() {
            if music.path == path {
                tracing::debug!("Music already active: {}", path);
                return;
            }

            self.stop_music();
            self.next_music = Some(path.to_string());
            tracing::info!("Queued music {} after fade-out", path);
            return;
        }

        self.start_music(path);
    }

    /// Fade the current track out without queueing another
    pub fn stop_music(&mut self) {
        if let Some(music) = self.music.as_mut() {
            music.fade = FadeState::FadeOut;
            self.next_music = None;
        }
    }

    fn start_music(&mut self, path: &str) {
        let Some(sound) = self.sounds[SoundCategory::Music.index()].get(path) else {
            tracing::debug!("Music not loaded, ignoring: {}", path);
            return;
        };
        let group = self.groups[SoundCategory::Music.index()];

        match start_silent(&mut self.engine, sound, group) {
            Ok(channel) => {
                self.music = Some(ActiveMusic {
                    path: path.to_string(),
                    channel,
                    fade: FadeState::FadeIn,
                });
                tracing::info!("Playing music: {}", path);
            }
            Err(e) => tracing::warn!("Failed to start music {}: {}", path, e),
        }
    }

    /// Advance fades by `delta_time` seconds, then tick the engine
    pub fn update(&mut self, delta_time: f32) {
        self.advance_fade(delta_time);

        if self.music.is_none() {
            if let Some(next) = self.next_music.take() {
                self.start_music(&next);
            }
        }

        self.engine.update();
    }

    fn advance_fade(&mut self, delta_time: f32) {
        let Some(music) = self.music.as_mut() else {
            return;
        };
        let channel = music.channel;
        let volume = match self.engine.channel_volume(channel) {
            Ok(volume) => volume,
            Err(e) => {
                tracing::warn!("Music channel for {} lost: {}", music.path, e);
                self.music = None;
                return;
            }
        };
        if !music.fade.is_fading() {
            return;
        }

        let applied = match music.fade.step(volume, delta_time, self.fade_seconds) {
            FadeStep::Idle => Ok(()),
            FadeStep::Ramping(next) => self.engine.set_channel_volume(channel, next),
            FadeStep::Finished(last) => {
                if music.fade == FadeState::FadeOut {
                    tracing::info!("Music faded out: {}", music.path);
                    if let Err(e) = self.engine.stop_channel(channel) {
                        tracing::debug!("Music channel already gone: {}", e);
                    }
                    self.music = None;
                    return;
                }
                music.fade = FadeState::None;
                self.engine.set_channel_volume(channel, last)
            }
        };

        if let Err(e) = applied {
            tracing::warn!("Music channel lost during fade: {}", e);
            self.music = None;
        }
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.engine.set_master_volume(volume.clamp(0.0, 1.0));
    }

    pub fn set_effects_volume(&mut self, volume: f32) {
        self.set_category_volume(SoundCategory::Effects, volume);
    }

    pub fn set_music_volume(&mut self, volume: f32) {
        self.set_category_volume(SoundCategory::Music, volume);
    }

    pub fn set_category_volume(&mut self, category: SoundCategory, volume: f32) {
        self.engine
            .set_group_volume(self.groups[category.index()], volume.clamp(0.0, 1.0));
    }

    pub fn master_volume(&self) -> f32 {
        self.engine.master_volume()
    }

    pub fn category_volume(&self, category: SoundCategory) -> f32 {
        self.engine.group_volume(self.groups[category.index()])
    }

    /// Seconds for a full 0..1 fade; non-positive values make fades instant
    pub fn set_fade_seconds(&mut self, seconds: f32) {
        self.fade_seconds = if seconds.is_finite() { seconds.max(0.0) } else { DEFAULT_FADE_SECONDS };
    }

    pub fn fade_seconds(&self) -> f32 {
        self.fade_seconds
    }

    pub fn is_loaded(&self, category: SoundCategory, path: &str) -> bool {
        self.sounds[category.index()].contains_key(path)
    }

    pub fn loaded_count(&self, category: SoundCategory) -> usize {
        self.sounds[category.index()].len()
    }

    /// Path of the active music track
    pub fn current_music(&self) -> Option<&str> {
        self.music.as_ref().map(|m| m.path.as_str())
    }

    /// Track waiting for the current one to fade out
    pub fn pending_music(&self) -> Option<&str> {
        self.next_music.as_deref()
    }

    pub fn fade_state(&self) -> FadeState {
        self.music.as_ref().map(|m| m.fade).unwrap_or_default()
    }

    /// Channel volume of the active track, before group and master gain
    pub fn music_channel_volume(&self) -> Option<f32> {
        let music = self.music.as_ref()?;
        self.engine.channel_volume(music.channel).ok()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}

/// Start an effect paused, apply its variation, then let it play
fn start_effect<E: SoundEngine>(
    engine: &mut E,
    sound: &E::Sound,
    group: E::Group,
    volume: f32,
    pitch: f32,
) -> Result<(), AudioError> {
    let channel = engine.play_sound(sound, group, true)?;
    engine.set_channel_volume(channel, volume)?;
    if pitch != 0.0 {
        let frequency = engine.channel_frequency(channel)?;
        engine.set_channel_frequency(channel, change_semitone(frequency, pitch))?;
    }
    engine.set_channel_paused(channel, false)
}

/// Start a sound at volume 0, ready to be faded in
fn start_silent<E: SoundEngine>(
    engine: &mut E,
    sound: &E::Sound,
    group: E::Group,
) -> Result<E::Channel, AudioError> {
    let channel = engine.play_sound(sound, group, true)?;
    engine.set_channel_volume(channel, 0.0)?;
    engine.set_channel_paused(channel, false)?;
    Ok(channel)
}

impl<E: SoundEngine, R: Rng> Drop for PlaybackManager<E, R> {
    fn drop(&mut self) {
        for group in self.groups {
            self.engine.stop_group(group);
        }
        let released: usize = self.sounds.iter().map(HashMap::len).sum();
        for sounds in self.sounds.iter_mut() {
            sounds.clear();
        }
        tracing::debug!("Released {} sounds", released);
    }
}
