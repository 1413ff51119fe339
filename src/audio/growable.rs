//! Adaptive compressed-data buffer.
//!
//! The buffer starts small and doubles whenever a decoder cannot make progress
//! on a full buffer. Growth is exact (a fresh allocation of twice the size)
//! and bounded by [`BufferLimits::max`].

use log::debug;

use crate::audio::memory::{try_alloc, try_alloc_zeroed};
use crate::error::{ConfigError, StreamError};
use crate::io::ByteSource;

/// Initial size of the compressed buffer
pub const MIN_BUFFER_SIZE: usize = 4096;

/// Hard cap on the compressed buffer (one second of 16-bit stereo at 44.1 kHz)
pub const MAX_BUFFER_SIZE: usize = 176400;

/// Validated size bounds for a [`CompressedBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferLimits {
    min: usize,
    max: usize,
}

impl BufferLimits {
    pub fn new(min: usize, max: usize) -> Result<Self, ConfigError> {
        if min == 0 {
            return Err(ConfigError::InvalidValue(
                "min_buffer_size must be greater than zero".to_string(),
            ));
        }
        if min > max {
            return Err(ConfigError::InvalidValue(format!(
                "min_buffer_size ({}) exceeds max_buffer_size ({})",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Largest size reachable by doubling from `min` without passing `max`
    pub fn largest_size(&self) -> usize {
        let mut size = self.min;
        while size.checked_mul(2).map_or(false, |next| next <= self.max) {
            size *= 2;
        }
        size
    }
}

impl Default for BufferLimits {
    fn default() -> Self {
        Self {
            min: MIN_BUFFER_SIZE,
            max: MAX_BUFFER_SIZE,
        }
    }
}

/// Compressed bytes waiting for the decoder.
///
/// `data.len()` is the allocated size; the first `filled` bytes are valid.
pub struct CompressedBuffer {
    data: Vec<u8>,
    filled: usize,
    limits: BufferLimits,
}

impl CompressedBuffer {
    pub fn new(limits: BufferLimits) -> Result<Self, StreamError> {
        Ok(Self {
            data: try_alloc_zeroed(limits.min())?,
            filled: 0,
            limits,
        })
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn filled(&self) -> usize {
        self.filled
    }

    pub fn room(&self) -> usize {
        self.data.len() - self.filled
    }

    pub fn is_full(&self) -> bool {
        self.filled == self.data.len()
    }

    pub fn limits(&self) -> BufferLimits {
        self.limits
    }

    /// Bytes buffered but not yet consumed by the decoder
    pub fn unconsumed(&self) -> &[u8] {
        &self.data[..self.filled]
    }

    /// Pull from `source` into the free tail. Returns the bytes added.
    pub fn fill_from<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<usize, StreamError> {
        if self.is_full() {
            return Ok(0);
        }
        let read = source.read_bytes(&mut self.data[self.filled..])?;
        debug_assert!(read <= self.room());
        self.filled += read;
        Ok(read)
    }

    /// Whether one more doubling stays within the cap
    pub fn can_grow(&self) -> bool {
        self.size()
            .checked_mul(2)
            .map_or(false, |next| next <= self.limits.max())
    }

    /// Double the buffer, keeping the buffered bytes at the front
    pub fn grow(&mut self) -> Result<(), StreamError> {
        if !self.can_grow() {
            return Err(StreamError::BufferCapExceeded {
                size: self.size(),
                cap: self.limits.max(),
            });
        }

        let new_size = self.size() * 2;
        let mut grown = try_alloc(new_size)?;
        grown.extend_from_slice(&self.data);
        grown.resize(new_size, 0);
        self.data = grown;

        debug!("Compressed buffer grown to {} bytes ({} filled)", new_size, self.filled);
        Ok(())
    }

    /// Drop the first `n` buffered bytes and shift the rest to the front
    pub fn consume(&mut self, n: usize) {
        assert!(n <= self.filled, "consumed {} of {} buffered bytes", n, self.filled);
        self.data.copy_within(n..self.filled, 0);
        self.filled -= n;
    }
}

impl std::fmt::Debug for CompressedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompressedBuffer")
            .field("size", &self.size())
            .field("filled", &self.filled)
            .field("limits", &self.limits)
            .finish()
    }
}
