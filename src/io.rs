//! Byte sources consumed by the decoders.
//!
//! A byte source is a pull-style, sequential provider of raw bytes. Anything
//! implementing [`std::io::Read`] is one. Sources are never seeked.

use std::io::{ErrorKind, Read};

use crate::audio::buffer::buffer_chunks;
use crate::audio::memory::{ChunkAllocator, SystemAllocator};
use crate::error::StreamError;

/// Sequential byte provider
pub trait ByteSource {
    /// Fill as much of `buf` as the source can provide.
    ///
    /// Returns the number of bytes written to the front of `buf`. `0` for a
    /// non-empty `buf` means the source is exhausted.
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, StreamError>;
}

impl<R: Read + ?Sized> ByteSource for R {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        let mut total = 0;
        while total < buf.len() {
            match self.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                // Bytes already read are kept; the error resurfaces on the next pull
                Err(_) if total > 0 => break,
                Err(err) => return Err(StreamError::Source(err)),
            }
        }
        Ok(total)
    }
}

/// Read the remaining contents of a byte source into a single exact-sized buffer
pub fn buffer_remaining<S: ByteSource + ?Sized>(source: &mut S) -> Result<Vec<u8>, StreamError> {
    buffer_remaining_with(source, &mut SystemAllocator::new())
}

/// [`buffer_remaining`] with an explicit chunk allocator
pub fn buffer_remaining_with<S, A>(source: &mut S, allocator: &mut A) -> Result<Vec<u8>, StreamError>
where
    S: ByteSource + ?Sized,
    A: ChunkAllocator + ?Sized,
{
    buffer_chunks(|chunk| source.read_bytes(chunk), allocator)
}
