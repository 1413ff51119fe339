//! The audio source capability object.
//!
//! An [`AudioSource`] pairs format metadata with a boxed implementation of
//! [`AudioSourceImpl`]. Playback backends only ever see the wrapper, so any
//! codec can be plugged in behind it.

use log::trace;

use crate::error::StreamError;
use crate::models::AudioSourceInfo;

/// Result of one PCM read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcmRead {
    /// `n` bytes were written to the front of the caller's buffer
    Bytes(usize),
    /// The source has no more PCM to deliver
    EndOfSource,
}

impl PcmRead {
    /// Bytes written by this read, `0` at end of source
    pub fn len(&self) -> usize {
        match self {
            PcmRead::Bytes(n) => *n,
            PcmRead::EndOfSource => 0,
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, PcmRead::EndOfSource)
    }
}

/// Codec-specific behavior behind an [`AudioSource`]
pub trait AudioSourceImpl {
    /// Write decoded PCM into `buf`, never more than `buf.len()` bytes.
    ///
    /// `offset` is the byte position the caller expects to read from.
    fn read_pcm(&mut self, offset: u64, buf: &mut [u8]) -> Result<PcmRead, StreamError>;

    /// Release codec resources. The default does nothing.
    fn close(self: Box<Self>) -> Result<(), StreamError> {
        Ok(())
    }
}

/// A source of decoded PCM with known format
pub struct AudioSource<'a> {
    info: AudioSourceInfo,
    imp: Box<dyn AudioSourceImpl + 'a>,
}

impl<'a> AudioSource<'a> {
    pub fn new(imp: Box<dyn AudioSourceImpl + 'a>, info: AudioSourceInfo) -> Self {
        Self { info, imp }
    }

    pub fn info(&self) -> &AudioSourceInfo {
        &self.info
    }

    /// Read PCM starting at `offset` into `buf`
    pub fn read_pcm(&mut self, offset: u64, buf: &mut [u8]) -> Result<PcmRead, StreamError> {
        let read = self.imp.read_pcm(offset, buf)?;
        assert!(
            read.len() <= buf.len(),
            "audio source wrote {} bytes into a {}-byte buffer",
            read.len(),
            buf.len()
        );
        Ok(read)
    }

    /// Run the codec's close hook and release the source
    pub fn close(self) -> Result<(), StreamError> {
        trace!("Closing audio source ({})", self.info.describe());
        self.imp.close()
    }
}

impl std::fmt::Debug for AudioSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSource").field("info", &self.info).finish_non_exhaustive()
    }
}
