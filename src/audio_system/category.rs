/// Sound categories
///
/// Each category has its own asset map, channel group and load mode.
use std::fmt;

use super::engine::LoadMode;

/// Sound asset categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCategory {
    /// Short one-shot effects, decoded into memory
    Effects,

    /// Long music tracks, streamed and looped
    Music,
}

impl SoundCategory {
    /// Number of categories, for per-category arrays
    pub const COUNT: usize = 2;

    /// All categories in index order
    pub const ALL: [SoundCategory; Self::COUNT] = [SoundCategory::Effects, SoundCategory::Music];

    /// Position of this category in per-category arrays
    pub fn index(self) -> usize {
        match self {
            SoundCategory::Effects => 0,
            SoundCategory::Music => 1,
        }
    }

    /// Engine mode used when creating sounds of this category
    pub fn load_mode(self) -> LoadMode {
        match self {
            SoundCategory::Effects => LoadMode::DEFAULT,
            SoundCategory::Music => LoadMode::DEFAULT.streaming().looping(),
        }
    }
}

impl fmt::Display for SoundCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundCategory::Effects => write!(f, "Effects"),
            SoundCategory::Music => write!(f, "Music"),
        }
    }
}
