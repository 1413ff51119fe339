pub mod buffer;
pub mod decoders;
pub mod growable;
pub mod memory;
pub mod sound;
pub mod source;
pub mod stream;

#[cfg(test)]
pub mod tests;

use log::debug;

use crate::error::StreamError;
use crate::io::ByteSource;

// Re-export the source capability
pub use source::{AudioSource, AudioSourceImpl, PcmRead};

// Re-export decoder types
pub use decoders::{Feed, FrameView, Opened, PushDecoder, VorbisDecoder};

// Re-export buffering types
pub use buffer::{buffer_chunks, buffer_pcm, CHUNK_SIZE};
pub use growable::{BufferLimits, CompressedBuffer, MAX_BUFFER_SIZE, MIN_BUFFER_SIZE};
pub use memory::{ChunkAllocator, MemoryStats, SystemAllocator};
pub use sound::BufferedSound;
pub use stream::{StreamDecoder, StreamStats};

// Re-export models for convenience
pub use crate::models::{AudioCodec, AudioSourceInfo};

/// Open a streaming Ogg Vorbis source with the default buffer limits
pub fn source_ogg<S: ByteSource + ?Sized>(source: &mut S) -> Result<AudioSource<'_>, StreamError> {
    source_ogg_with_limits(source, BufferLimits::default())
}

/// Open a streaming Ogg Vorbis source
pub fn source_ogg_with_limits<S: ByteSource + ?Sized>(
    source: &mut S,
    limits: BufferLimits,
) -> Result<AudioSource<'_>, StreamError> {
    let stream = StreamDecoder::<S, VorbisDecoder>::open(source, limits)?;
    Ok(stream.into_source())
}

/// WAV sources are not provided
pub fn source_wav<S: ByteSource + ?Sized>(_source: &mut S) -> Result<AudioSource<'_>, StreamError> {
    debug!("Refusing to open a WAV source");
    Err(StreamError::Unsupported("sourcing WAVs".to_string()))
}

/// MP3 sources are not provided
pub fn source_mp3<S: ByteSource + ?Sized>(_source: &mut S) -> Result<AudioSource<'_>, StreamError> {
    debug!("Refusing to open an MP3 source");
    Err(StreamError::Unsupported("sourcing MP3s".to_string()))
}
