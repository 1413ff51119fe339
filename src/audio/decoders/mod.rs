//! Push-style decoders.
//!
//! A push decoder never reads on its own. The streaming engine hands it the
//! compressed bytes it has buffered so far, and the decoder answers either
//! "need more" or how many of those bytes it consumed.

pub mod ogg;
pub mod vorbis;

pub use vorbis::VorbisDecoder;

use crate::error::StreamError;

/// Outcome of trying to open a decoder on buffered bytes
pub enum Opened<D> {
    /// The header is not complete yet
    NeedMore,
    /// The header parsed; `header_len` bytes were consumed
    Ready { decoder: D, header_len: usize },
}

/// Outcome of one decode step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    /// No complete frame is buffered
    NeedMore,
    /// `consumed` bytes were used to produce `samples` samples per channel
    Consumed { consumed: usize, samples: usize },
}

/// Planar samples of the most recent frame, borrowed from the decoder
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'d> {
    planes: &'d [Vec<f32>],
}

impl<'d> FrameView<'d> {
    pub fn new(planes: &'d [Vec<f32>]) -> Self {
        Self { planes }
    }

    pub fn channels(&self) -> usize {
        self.planes.len()
    }

    /// Samples per channel
    pub fn len(&self) -> usize {
        self.planes.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sample(&self, channel: usize, index: usize) -> f32 {
        self.planes[channel][index]
    }
}

/// A decoder fed from a caller-owned compressed buffer
pub trait PushDecoder: Sized {
    /// Try to parse the stream header from the start of `data`
    fn open(data: &[u8]) -> Result<Opened<Self>, StreamError>;

    fn sample_rate(&self) -> u32;

    fn channels(&self) -> u16;

    /// Decode at most one frame from the start of `data`.
    ///
    /// On `Consumed`, the decoded samples replace the previous frame.
    fn accept(&mut self, data: &[u8]) -> Result<Feed, StreamError>;

    /// The frame produced by the last successful `accept`
    fn frame(&self) -> FrameView<'_>;
}
