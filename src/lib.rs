//! Sound effects and crossfaded music on top of a pluggable sound engine.
//!
//! [`audio_system::PlaybackManager`] is the entry point. It plays through
//! rodio via [`audio_system::RodioEngine`], or silently via
//! [`audio_system::HeadlessEngine`].

pub mod audio_system;
pub mod config;
pub mod error;
pub mod logging;

pub use audio_system::{EffectParams, PlaybackManager, SoundCategory};
pub use config::AudioConfig;
pub use error::{AppResult, AudioError, ConfigError};
