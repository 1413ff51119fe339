//! Chunked buffering of pull sources of unknown length.
//!
//! The source is drained into fixed-size chunks first, so the total size is
//! known before the one contiguous allocation is made. Chunks are released as
//! they are copied out, and every failure path drops the whole chunk list, so
//! either exactly one buffer survives or nothing does.

use log::{debug, trace};

use crate::audio::memory::{ChunkAllocator, SystemAllocator};
use crate::audio::source::{AudioSource, PcmRead};
use crate::error::StreamError;

/// Size of one intermediate chunk in bytes
pub const CHUNK_SIZE: usize = 1024;

/// One fixed-size block of buffered data
struct Chunk {
    data: Vec<u8>,
}

/// Chunks collected during a single buffering call
struct ChunkList {
    chunks: Vec<Chunk>,
    total: usize,
}

impl ChunkList {
    fn new() -> Self {
        Self {
            chunks: Vec::new(),
            total: 0,
        }
    }

    /// Copy `bytes` into a newly allocated chunk at the tail of the list
    fn push<A: ChunkAllocator + ?Sized>(&mut self, bytes: &[u8], allocator: &mut A) -> Result<(), StreamError> {
        debug_assert!(bytes.len() <= CHUNK_SIZE);

        let mut data = allocator.allocate(CHUNK_SIZE)?;
        self.chunks
            .try_reserve(1)
            .map_err(|_| StreamError::OutOfMemory {
                requested: std::mem::size_of::<Chunk>(),
            })?;

        data.extend_from_slice(bytes);
        self.total += bytes.len();
        self.chunks.push(Chunk { data });
        Ok(())
    }

    /// Move every chunk into one buffer of exactly `total` bytes
    fn into_contiguous<A: ChunkAllocator + ?Sized>(mut self, allocator: &mut A) -> Result<Vec<u8>, StreamError> {
        let mut buffer = allocator.allocate(self.total)?;

        // Each chunk is dropped as soon as its bytes are copied
        for chunk in self.chunks.drain(..) {
            buffer.extend_from_slice(&chunk.data);
        }

        debug_assert_eq!(buffer.len(), self.total);
        Ok(buffer)
    }
}

/// Drain `pull` into one contiguous, exactly sized buffer.
///
/// `pull` fills a chunk-sized slice and returns how many bytes it wrote;
/// `0` ends the buffering. Errors from `pull` or from `allocator` free
/// everything collected so far and are returned unchanged.
pub fn buffer_chunks<F, A>(mut pull: F, allocator: &mut A) -> Result<Vec<u8>, StreamError>
where
    F: FnMut(&mut [u8]) -> Result<usize, StreamError>,
    A: ChunkAllocator + ?Sized,
{
    let mut list = ChunkList::new();
    let mut staging = [0u8; CHUNK_SIZE];

    loop {
        let read = pull(&mut staging)?;
        if read == 0 {
            break;
        }
        assert!(read <= CHUNK_SIZE, "pull reported {} bytes for a {}-byte chunk", read, CHUNK_SIZE);
        list.push(&staging[..read], allocator)?;
    }

    trace!("Collected {} chunks ({} bytes)", list.chunks.len(), list.total);
    list.into_contiguous(allocator)
}

/// Decode every remaining PCM byte of `source` into one buffer
pub fn buffer_pcm(source: &mut AudioSource<'_>) -> Result<Vec<u8>, StreamError> {
    buffer_pcm_with(source, &mut SystemAllocator::new())
}

/// [`buffer_pcm`] with an explicit chunk allocator
pub fn buffer_pcm_with<A: ChunkAllocator + ?Sized>(
    source: &mut AudioSource<'_>,
    allocator: &mut A,
) -> Result<Vec<u8>, StreamError> {
    let mut offset = 0;
    let pcm = buffer_chunks(
        |chunk| match source.read_pcm(offset, chunk)? {
            PcmRead::Bytes(n) => {
                offset += n as u64;
                Ok(n)
            }
            PcmRead::EndOfSource => Ok(0),
        },
        allocator,
    )?;

    debug!("Buffered {} bytes of PCM", pcm.len());
    Ok(pcm)
}
