use std::time::Duration;

use log::debug;

use crate::audio::buffer::buffer_pcm;
use crate::audio::source::AudioSource;
use crate::error::StreamError;
use crate::models::AudioSourceInfo;

/// Fully decoded PCM together with its format
#[derive(Debug, Clone, PartialEq)]
pub struct BufferedSound {
    info: AudioSourceInfo,
    pcm: Vec<u8>,
}

impl BufferedSound {
    /// Decode all of `source` into memory, then close it.
    ///
    /// The source is closed even when buffering fails.
    pub fn buffer(mut source: AudioSource<'_>) -> Result<Self, StreamError> {
        let info = *source.info();
        let buffered = buffer_pcm(&mut source);
        let closed = source.close();

        let pcm = buffered?;
        closed?;

        debug!("Buffered sound: {} bytes, {}", pcm.len(), info.describe());
        Ok(Self { info, pcm })
    }

    pub fn from_parts(info: AudioSourceInfo, pcm: Vec<u8>) -> Self {
        Self { info, pcm }
    }

    pub fn info(&self) -> &AudioSourceInfo {
        &self.info
    }

    /// Interleaved signed 16-bit little-endian samples
    pub fn pcm(&self) -> &[u8] {
        &self.pcm
    }

    pub fn into_pcm(self) -> Vec<u8> {
        self.pcm
    }

    /// Number of whole PCM frames
    pub fn frames(&self) -> usize {
        match self.info.frame_size() {
            0 => 0,
            size => self.pcm.len() / size,
        }
    }

    pub fn duration(&self) -> Duration {
        self.info.duration_of(self.pcm.len())
    }
}
