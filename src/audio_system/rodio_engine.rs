/// rodio-backed sound engine
///
/// Every channel is its own rodio `Sink` on a shared output stream. rodio has
/// no mixing buses, so group and master volumes are tracked here and folded
/// into each sink's volume.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use crate::error::AudioError;

use super::engine::{LoadMode, SoundEngine};

/// Default number of simultaneous channels
pub const DEFAULT_MAX_CHANNELS: usize = 128;

type BoxedSource = Box<dyn Source<Item = i16> + Send>;

/// Sound created by [`RodioEngine`]
///
/// Non-streaming sounds keep the whole file in memory and decode a fresh
/// copy per play; streaming sounds reopen the file each time.
#[derive(Debug, Clone)]
pub struct RodioSound {
    path: PathBuf,
    mode: LoadMode,
    data: Option<Arc<[u8]>>,
}

impl RodioSound {
    /// Validate and prepare a sound without needing an output device
    pub fn load(path: &Path, mode: LoadMode) -> Result<Self, AudioError> {
        if !path.exists() {
            return Err(AudioError::NotFound(path.display().to_string()));
        }

        if mode.streaming {
            // Probe the header only; the body is decoded during playback
            let file = File::open(path).map_err(|e| AudioError::LoadFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })?;
            Decoder::new(BufReader::new(file))
                .map_err(|e| AudioError::DecodeFailed(Box::new(e)))?;
            tracing::info!("Opened audio stream: {}", path.display());

            return Ok(Self {
                path: path.to_path_buf(),
                mode,
                data: None,
            });
        }

        let bytes = std::fs::read(path).map_err(|e| AudioError::LoadFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;
        let data: Arc<[u8]> = Arc::from(bytes);

        // Verify the audio can be decoded
        let decoder = Decoder::new(Cursor::new(Arc::clone(&data)))
            .map_err(|e| AudioError::DecodeFailed(Box::new(e)))?;
        let _ = decoder.count();

        tracing::info!(
            "Preloaded audio file: {} ({} bytes)",
            path.display(),
            data.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            mode,
            data: Some(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> LoadMode {
        self.mode
    }

    /// Build a fresh decoder for one playback
    fn open_source(&self) -> Result<BoxedSource, AudioError> {
        let decode_err = |e: rodio::decoder::DecoderError| AudioError::DecodeFailed(Box::new(e));

        let source: BoxedSource = match &self.data {
            Some(data) => {
                let cursor = Cursor::new(Arc::clone(data));
                if self.mode.looping {
                    Box::new(Decoder::new_looped(cursor).map_err(decode_err)?)
                } else {
                    Box::new(Decoder::new(cursor).map_err(decode_err)?)
                }
            }
            None => {
                let file = File::open(&self.path).map_err(|e| AudioError::LoadFailed {
                    path: self.path.display().to_string(),
                    source: Box::new(e),
                })?;
                let reader = BufReader::new(file);
                if self.mode.looping {
                    Box::new(Decoder::new_looped(reader).map_err(decode_err)?)
                } else {
                    Box::new(Decoder::new(reader).map_err(decode_err)?)
                }
            }
        };

        Ok(source)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RodioGroup(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RodioChannel(u64);

struct GroupState {
    name: String,
    volume: f32,
}

struct ChannelState {
    sink: Sink,
    group: usize,
    volume: f32,
    base_frequency: f32,
    frequency: f32,
}

/// Combined gain for a channel routed through `group` and the master bus
fn effective_volume(master: f32, group: f32, channel: f32) -> f32 {
    (master * group * channel).max(0.0)
}

/// [`SoundEngine`] playing through the default output device
pub struct RodioEngine {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    groups: Vec<GroupState>,
    channels: HashMap<u64, ChannelState>,
    next_channel: u64,
    master_volume: f32,
    max_channels: usize,
}

impl RodioEngine {
    /// Open the default output device
    pub fn new(max_channels: usize) -> Result<Self, AudioError> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| AudioError::StreamInitFailed(Box::new(e)))?;

        tracing::info!("Audio output opened ({} channels max)", max_channels);

        Ok(Self {
            _stream: stream,
            stream_handle,
            groups: Vec::new(),
            channels: HashMap::new(),
            next_channel: 1,
            master_volume: 1.0,
            max_channels,
        })
    }

    /// Number of live channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn channel(&self, channel: RodioChannel) -> Result<&ChannelState, AudioError> {
        self.channels
            .get(&channel.0)
            .ok_or(AudioError::InvalidChannel(channel.0))
    }

    fn group_gain(&self, group: usize) -> f32 {
        self.groups.get(group).map(|g| g.volume).unwrap_or(0.0)
    }

    fn apply_volume(&self, state: &ChannelState) {
        let gain = effective_volume(self.master_volume, self.group_gain(state.group), state.volume);
        state.sink.set_volume(gain);
    }

    fn refresh_volumes(&self) {
        for state in self.channels.values() {
            self.apply_volume(state);
        }
    }
}

impl SoundEngine for RodioEngine {
    type Sound = RodioSound;
    type Group = RodioGroup;
    type Channel = RodioChannel;

    fn create_group(&mut self, name: &str) -> Result<Self::Group, AudioError> {
        self.groups.push(GroupState {
            name: name.to_string(),
            volume: 1.0,
        });
        tracing::debug!("Created channel group '{}'", name);
        Ok(RodioGroup(self.groups.len() - 1))
    }

    fn create_sound(&mut self, path: &Path, mode: LoadMode) -> Result<Self::Sound, AudioError> {
        RodioSound::load(path, mode)
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
            // Finished sinks may not have been reclaimed yet this tick
            self.channels.retain(|_, c| !c.sink.empty());
            if self.channels.len() >= self.max_channels {
                return Err(AudioError::ChannelLimit(self.max_channels));
            }
        }

        let source = sound.open_source()?;
        let base_frequency = source.sample_rate() as f32;

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| AudioError::PlaybackFailed(Box::new(e)))?;
        if paused {
            sink.pause();
        }
        sink.append(source);

        let state = ChannelState {
            sink,
            group: group.0,
            volume: 1.0,
            base_frequency,
            frequency: base_frequency,
        };
        self.apply_volume(&state);

        let id = self.next_channel;
        self.next_channel += 1;
        self.channels.insert(id, state);

        tracing::debug!(
            "Playing {} on channel {} (group '{}')",
            sound.path.display(),
            id,
            self.groups[group.0].name
        );
        Ok(RodioChannel(id))
    }

    fn channel_volume(&self, channel: Self::Channel) -> Result<f32, AudioError> {
        Ok(self.channel(channel)?.volume)
    }

    fn set_channel_volume(&mut self, channel: Self::Channel, volume: f32) -> Result<(), AudioError> {
        let state = self
            .channels
            .get_mut(&channel.0)
            .ok_or(AudioError::InvalidChannel(channel.0))?;
        state.volume = volume;
        let gain = effective_volume(
            self.master_volume,
            self.groups.get(state.group).map(|g| g.volume).unwrap_or(0.0),
            volume,
        );
        state.sink.set_volume(gain);
        Ok(())
    }

    fn channel_frequency(&self, channel: Self::Channel) -> Result<f32, AudioError> {
        Ok(self.channel(channel)?.frequency)
    }

    fn set_channel_frequency(&mut self, channel: Self::Channel, frequency: f32) -> Result<(), AudioError> {
        let state = self
            .channels
            .get_mut(&channel.0)
            .ok_or(AudioError::InvalidChannel(channel.0))?;
        state.frequency = frequency;
        if state.base_frequency > 0.0 {
            state.sink.set_speed(frequency / state.base_frequency);
        }
        Ok(())
    }

    fn set_channel_paused(&mut self, channel: Self::Channel, paused: bool) -> Result<(), AudioError> {
        let state = self.channel(channel)?;
        if paused {
            state.sink.pause();
        } else {
            state.sink.play();
        }
        Ok(())
    }

    fn stop_channel(&mut self, channel: Self::Channel) -> Result<(), AudioError> {
        let state = self
            .channels
            .remove(&channel.0)
            .ok_or(AudioError::InvalidChannel(channel.0))?;
        state.sink.stop();
        Ok(())
    }

    fn stop_group(&mut self, group: Self::Group) {
        self.channels.retain(|_, state| {
            if state.group == group.0 {
                state.sink.stop();
                false
            } else {
                true
            }
        });
        tracing::debug!("Stopped channel group {}", group.0);
    }

    fn group_volume(&self, group: Self::Group) -> f32 {
        self.group_gain(group.0)
    }

    fn set_group_volume(&mut self, group: Self::Group, volume: f32) {
        if let Some(g) = self.groups.get_mut(group.0) {
            g.volume = volume;
        }
        self.refresh_volumes();
    }

    fn master_volume(&self) -> f32 {
        self.master_volume
    }

    fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume;
        self.refresh_volumes();
    }

    fn update(&mut self) {
        let before = self.channels.len();
        self.channels.retain(|_, state| !state.sink.empty());
        let reclaimed = before - self.channels.len();
        if reclaimed > 0 {
            tracing::trace!("Reclaimed {} finished channels", reclaimed);
        }
    }
}

impl Drop for RodioEngine {
    fn drop(&mut self) {
        for state in self.channels.values() {
            state.sink.stop();
        }
        tracing::debug!("Audio output closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // Output devices aren't available in CI, so these cover the parts of the
    // engine that work without one.

    #[test]
    fn test_effective_volume() {
        assert_eq!(effective_volume(1.0, 1.0, 1.0), 1.0);
        assert_eq!(effective_volume(0.5, 0.5, 1.0), 0.25);
        assert_eq!(effective_volume(1.0, 0.0, 1.0), 0.0);
        assert_eq!(effective_volume(-1.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn test_load_missing_file() {
        let result = RodioSound::load(Path::new("nonexistent.mp3"), LoadMode::DEFAULT);
        assert!(matches!(result, Err(AudioError::NotFound(_))));

        let result = RodioSound::load(
            Path::new("nonexistent.ogg"),
            LoadMode::DEFAULT.streaming().looping(),
        );
        assert!(matches!(result, Err(AudioError::NotFound(_))));
    }

    #[test]
    fn test_load_garbage_fails_to_decode() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not audio data").unwrap();

        let result = RodioSound::load(file.path(), LoadMode::DEFAULT);
        assert!(matches!(result, Err(AudioError::DecodeFailed(_))));

        let result = RodioSound::load(file.path(), LoadMode::DEFAULT.streaming());
        assert!(matches!(result, Err(AudioError::DecodeFailed(_))));
    }
}
