/// Silent sound engine
///
/// Implements [`SoundEngine`] without touching an audio device. Every
/// channel, group and volume is tracked in memory so callers can inspect
/// what would have been heard. Used by the test suite and by
/// `soundstage --headless`.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::AudioError;

use super::engine::{LoadMode, SoundEngine};

/// Frequency reported for every headless channel
pub const HEADLESS_FREQUENCY: f32 = 44_100.0;

/// Sound created by the headless engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessSound {
    pub path: PathBuf,
    pub mode: LoadMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeadlessGroup(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeadlessChannel(u64);

/// Snapshot of one live headless channel
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelInfo {
    pub path: PathBuf,
    pub group: HeadlessGroup,
    pub volume: f32,
    pub frequency: f32,
    pub paused: bool,
    pub looping: bool,
}

#[derive(Debug)]
struct GroupInfo {
    name: String,
    volume: f32,
}

/// In-memory [`SoundEngine`]
#[derive(Debug)]
pub struct HeadlessEngine {
    groups: Vec<GroupInfo>,
    channels: HashMap<u64, ChannelInfo>,
    next_channel: u64,
    master_volume: f32,
    max_channels: usize,
    require_files: bool,
    sounds_created: usize,
    updates: u64,
}

impl HeadlessEngine {
    /// Engine that accepts any path
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            channels: HashMap::new(),
            next_channel: 1,
            master_volume: 1.0,
            max_channels: usize::MAX,
            require_files: false,
            sounds_created: 0,
            updates: 0,
        }
    }

    /// Refuse to create sounds for paths that don't exist on disk
    pub fn with_file_check(mut self) -> Self {
        self.require_files = true;
        self
    }

    pub fn with_max_channels(mut self, max_channels: usize) -> Self {
        self.max_channels = max_channels;
        self
    }

    /// Live channels
    pub fn channels(&self) -> impl Iterator<Item = &ChannelInfo> {
        self.channels.values()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Live channels playing `path`
    pub fn channels_playing(&self, path: impl AsRef<Path>) -> Vec<&ChannelInfo> {
        let path = path.as_ref();
        self.channels.values().filter(|c| c.path == path).collect()
    }

    pub fn channel(&self, channel: HeadlessChannel) -> Option<&ChannelInfo> {
        self.channels.get(&channel.0)
    }

    /// Group name as given to `create_group`
    pub fn group_name(&self, group: HeadlessGroup) -> Option<&str> {
        self.groups.get(group.0).map(|g| g.name.as_str())
    }

    /// Number of successful `create_sound` calls
    pub fn sounds_created(&self) -> usize {
        self.sounds_created
    }

    /// Number of `update` calls
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Drop every non-looping channel, as if the sounds played to the end
    pub fn finish_one_shots(&mut self) {
        self.channels.retain(|_, c| c.looping);
    }

    fn channel_mut(&mut self, channel: HeadlessChannel) -> Result<&mut ChannelInfo, AudioError> {
        self.channels
            .get_mut(&channel.0)
            .ok_or(AudioError::InvalidChannel(channel.0))
    }

    fn channel_ref(&self, channel: HeadlessChannel) -> Result<&ChannelInfo, AudioError> {
        self.channels
            .get(&channel.0)
            .ok_or(AudioError::InvalidChannel(channel.0))
    }
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundEngine for HeadlessEngine {
    type Sound = HeadlessSound;
    type Group = HeadlessGroup;
    type Channel = HeadlessChannel;

    fn create_group(&mut self, name: &str) -> Result<Self::Group, AudioError> {
        self.groups.push(GroupInfo {
            name: name.to_string(),
            volume: 1.0,
        });
        Ok(HeadlessGroup(self.groups.len() - 1))
    }

    fn create_sound(&mut self, path: &Path, mode: LoadMode) -> Result<Self::Sound, AudioError> {
        if self.require_files && !path.exists() {
            return Err(AudioError::NotFound(path.display().to_string()));
        }
        self.sounds_created += 1;
        Ok(HeadlessSound {
            path: path.to_path_buf(),
            mode,
        })
    }

    fn play_sound(
        &mut self,
        sound: &Self::Sound,
        group: Self::Group,
        paused: bool,
    ) -> Result<Self::Channel, AudioError> {
        if group.0 >= self.groups.len() {
            return Err(AudioError::InvalidGroup(group.0));
        }
        if self.channels.len() >= self.max_channels {
            return Err(AudioError::ChannelLimit(self.max_channels));
        }

        let id = self.next_channel;
        self.next_channel += 1;
        self.channels.insert(
            id,
            ChannelInfo {
                path: sound.path.clone(),
                group,
                volume: 1.0,
                frequency: HEADLESS_FREQUENCY,
                paused,
                looping: sound.mode.looping,
            },
        );
        Ok(HeadlessChannel(id))
    }

    fn channel_volume(&self, channel: Self::Channel) -> Result<f32, AudioError> {
        Ok(self.channel_ref(channel)?.volume)
    }

    fn set_channel_volume(&mut self, channel: Self::Channel, volume: f32) -> Result<(), AudioError> {
        self.channel_mut(channel)?.volume = volume;
        Ok(())
    }

    fn channel_frequency(&self, channel: Self::Channel) -> Result<f32, AudioError> {
        Ok(self.channel_ref(channel)?.frequency)
    }

    fn set_channel_frequency(&mut self, channel: Self::Channel, frequency: f32) -> Result<(), AudioError> {
        self.channel_mut(channel)?.frequency = frequency;
        Ok(())
    }

    fn set_channel_paused(&mut self, channel: Self::Channel, paused: bool) -> Result<(), AudioError> {
        self.channel_mut(channel)?.paused = paused;
        Ok(())
    }

    fn stop_channel(&mut self, channel: Self::Channel) -> Result<(), AudioError> {
        self.channels
            .remove(&channel.0)
            .map(|_| ())
            .ok_or(AudioError::InvalidChannel(channel.0))
    }

    fn stop_group(&mut self, group: Self::Group) {
        self.channels.retain(|_, c| c.group != group);
    }

    fn group_volume(&self, group: Self::Group) -> f32 {
        self.groups.get(group.0).map(|g| g.volume).unwrap_or(0.0)
    }

    fn set_group_volume(&mut self, group: Self::Group, volume: f32) {
        if let Some(g) = self.groups.get_mut(group.0) {
            g.volume = volume;
        }
    }

    fn master_volume(&self) -> f32 {
        self.master_volume
    }

    fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume;
    }

    /// One-shots finish instantly; looping and paused channels survive
    fn update(&mut self) {
        self.updates += 1;
        self.channels.retain(|_, c| c.looping || c.paused);
    }
}
