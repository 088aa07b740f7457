/// Audio system module
///
/// Provides a small playback façade over a sound engine:
/// - One-shot effects with randomized volume and pitch
/// - A single looping music track with fade-in/fade-out crossfades
/// - Per-category channel groups under a master bus
///
/// ## Architecture
///
/// ```text
/// PlaybackManager
///   ├── SoundEngine (RodioEngine | HeadlessEngine)
///   │     └── master bus
///   │           ├── "effects" group ── one channel per play_effect
///   │           └── "music" group   ── the active music channel
///   ├── asset map per SoundCategory
///   └── music slot: path + channel + FadeState, plus a pending path
/// ```
///
/// ## Usage
///
/// ```rust,ignore
/// use soundstage::audio_system::{EffectParams, PlaybackManager, RodioEngine};
///
/// let mut audio = PlaybackManager::new(RodioEngine::new(128)?)?;
/// audio.load_effect("sfx/jump.wav")?;
/// audio.load_music("music/level1.ogg")?;
///
/// audio.play_music("music/level1.ogg");
/// audio.play_effect("sfx/jump.wav", EffectParams::none().with_volume(0.8, 1.0).with_pitch(-1.0, 1.0));
///
/// // Once per frame
/// audio.update(dt);
/// ```
pub mod category;
pub mod effects;
pub mod engine;
pub mod headless;
pub mod manager;
pub mod rodio_engine;

// Re-export commonly used types
pub use category::SoundCategory;
pub use effects::{EffectParams, FadeState, RandomRange};
pub use engine::{LoadMode, SoundEngine};
pub use headless::HeadlessEngine;
pub use manager::PlaybackManager;
pub use rodio_engine::{RodioEngine, DEFAULT_MAX_CHANNELS};
