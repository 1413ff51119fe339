use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::audio::growable::BufferLimits;
use crate::audio::source::AudioSource;
use crate::error::StreamError;
use crate::io::ByteSource;

/// Format of the PCM an audio source delivers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AudioSourceInfo {
    pub frequency_hz: u32,
    pub channel_count: u16,
    pub bits_per_sample: u16,
}

impl AudioSourceInfo {
    /// 16-bit PCM with the given rate and channel count
    pub fn s16(frequency_hz: u32, channel_count: u16) -> Self {
        Self {
            frequency_hz,
            channel_count,
            bits_per_sample: 16,
        }
    }

    /// Bytes per interleaved frame (one sample for every channel)
    pub fn frame_size(&self) -> usize {
        self.channel_count as usize * (self.bits_per_sample as usize / 8)
    }

    pub fn bytes_per_second(&self) -> u64 {
        self.frequency_hz as u64 * self.frame_size() as u64
    }

    /// Playback time of `bytes` bytes of PCM in this format
    pub fn duration_of(&self, bytes: usize) -> Duration {
        let rate = self.bytes_per_second();
        if rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(bytes as f64 / rate as f64)
    }

    /// Get a human-readable format description
    pub fn describe(&self) -> String {
        format!(
            "{}-bit/{} Hz - {} channel{}",
            self.bits_per_sample,
            self.frequency_hz,
            self.channel_count,
            if self.channel_count == 1 { "" } else { "s" }
        )
    }
}

/// Compressed formats an audio source can be requested for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AudioCodec {
    OggVorbis,
    Wav,
    Mp3,
}

impl AudioCodec {
    /// Get the human-readable name of the codec
    pub fn name(&self) -> &'static str {
        match self {
            AudioCodec::OggVorbis => "OGG Vorbis",
            AudioCodec::Wav => "WAV",
            AudioCodec::Mp3 => "MP3",
        }
    }

    /// Get file extensions associated with this codec
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            AudioCodec::OggVorbis => &["ogg", "oga"],
            AudioCodec::Wav => &["wav", "wave"],
            AudioCodec::Mp3 => &["mp3"],
        }
    }

    /// Look up a codec by file extension, ignoring case
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_lowercase();
        [AudioCodec::OggVorbis, AudioCodec::Wav, AudioCodec::Mp3]
            .into_iter()
            .find(|codec| codec.extensions().contains(&ext.as_str()))
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Open an audio source of this format over `source`
    pub fn open<'a, S: ByteSource + ?Sized>(
        &self,
        source: &'a mut S,
        limits: BufferLimits,
    ) -> Result<AudioSource<'a>, StreamError> {
        match self {
            AudioCodec::OggVorbis => crate::audio::source_ogg_with_limits(source, limits),
            AudioCodec::Wav => crate::audio::source_wav(source),
            AudioCodec::Mp3 => crate::audio::source_mp3(source),
        }
    }
}

impl std::fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
