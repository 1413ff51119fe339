//! Fallible allocation for audio buffers.
//!
//! Buffer growth and chunked buffering must report allocation failure as
//! [`StreamError::OutOfMemory`] instead of aborting, so every allocation they
//! make goes through [`try_alloc`] or a [`ChunkAllocator`].

use crate::error::StreamError;

/// Allocate an empty byte vector with capacity for exactly `len` bytes
pub fn try_alloc(len: usize) -> Result<Vec<u8>, StreamError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| StreamError::OutOfMemory { requested: len })?;
    Ok(buf)
}

/// Allocate a zero-filled byte vector of exactly `len` bytes
pub fn try_alloc_zeroed(len: usize) -> Result<Vec<u8>, StreamError> {
    let mut buf = try_alloc(len)?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Allocation seam used by the chunked buffering utility.
///
/// Implementations return an empty vector with at least `len` bytes of
/// capacity, or `StreamError::OutOfMemory`.
pub trait ChunkAllocator {
    fn allocate(&mut self, len: usize) -> Result<Vec<u8>, StreamError>;
}

/// Allocator backed by the global heap, with usage counters
#[derive(Debug, Default, Clone)]
pub struct SystemAllocator {
    allocation_count: usize,
    bytes_requested: usize,
    peak_request: usize,
}

impl SystemAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> MemoryStats {
        MemoryStats {
            allocation_count: self.allocation_count,
            bytes_requested: self.bytes_requested,
            peak_request: self.peak_request,
        }
    }
}

impl ChunkAllocator for SystemAllocator {
    fn allocate(&mut self, len: usize) -> Result<Vec<u8>, StreamError> {
        let buf = try_alloc(len)?;
        self.allocation_count += 1;
        self.bytes_requested = self.bytes_requested.saturating_add(len);
        self.peak_request = self.peak_request.max(len);
        Ok(buf)
    }
}

impl<A: ChunkAllocator + ?Sized> ChunkAllocator for &mut A {
    fn allocate(&mut self, len: usize) -> Result<Vec<u8>, StreamError> {
        (**self).allocate(len)
    }
}

/// Allocation statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryStats {
    pub allocation_count: usize,
    pub bytes_requested: usize,
    pub peak_request: usize,
}

impl MemoryStats {
    /// Format memory statistics as human-readable string
    pub fn format_summary(&self) -> String {
        format!(
            "Allocations: {}, Requested: {:.1} KB, Largest: {:.1} KB",
            self.allocation_count,
            self.bytes_requested as f64 / 1024.0,
            self.peak_request as f64 / 1024.0,
        )
    }
}
