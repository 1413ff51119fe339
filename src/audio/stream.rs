//! Streaming decode engine.
//!
//! [`StreamDecoder`] drives a [`PushDecoder`] from a borrowed byte source. It
//! owns the compressed buffer, grows it when the decoder cannot make progress
//! on a full buffer, and serializes decoded frames into caller buffers as
//! interleaved signed 16-bit little-endian PCM, across as many calls as the
//! caller likes.

use log::{debug, trace, warn};

use crate::audio::decoders::{Feed, Opened, PushDecoder};
use crate::audio::growable::{BufferLimits, CompressedBuffer};
use crate::audio::source::{AudioSource, AudioSourceImpl, PcmRead};
use crate::error::{DecodeError, StreamError};
use crate::io::ByteSource;
use crate::models::AudioSourceInfo;

const BYTES_PER_SAMPLE: usize = 2;

/// Counters describing the work a stream has done so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub read_calls: u64,
    pub decode_steps: u64,
    pub buffer_growths: u64,
    pub bytes_delivered: u64,
}

impl StreamStats {
    pub fn format_summary(&self) -> String {
        format!(
            "{} reads, {} decode steps, {} buffer growths, {} bytes delivered",
            self.read_calls, self.decode_steps, self.buffer_growths, self.bytes_delivered
        )
    }
}

/// Read cursor into the decoder's current frame
#[derive(Debug, Clone, Copy)]
struct Pending {
    index: usize,
    count: usize,
}

/// Incremental decoder over a byte source.
///
/// The byte source is borrowed for the decoder's lifetime and is never
/// closed by it.
pub struct StreamDecoder<'a, S: ByteSource + ?Sized, D: PushDecoder> {
    source: &'a mut S,
    buffer: CompressedBuffer,
    decoder: D,
    header_len: usize,
    expected_offset: u64,
    channels: usize,
    pending: Option<Pending>,
    deferred_error: Option<StreamError>,
    stats: StreamStats,
}

impl<'a, S: ByteSource + ?Sized, D: PushDecoder> StreamDecoder<'a, S, D> {
    /// Buffer and parse the stream header.
    ///
    /// Fails with `Stalled` when the source runs dry before the header is
    /// complete, and with `BufferCapExceeded` when the header does not fit
    /// within `limits`.
    pub fn open(source: &'a mut S, limits: BufferLimits) -> Result<Self, StreamError> {
        let mut buffer = CompressedBuffer::new(limits)?;
        let mut stats = StreamStats::default();

        buffer.fill_from(&mut *source)?;

        let (decoder, header_len) = loop {
            match D::open(buffer.unconsumed())? {
                Opened::Ready { decoder, header_len } => break (decoder, header_len),
                Opened::NeedMore => {
                    if buffer.is_full() {
                        buffer.grow()?;
                        stats.buffer_growths += 1;
                    }
                    if buffer.fill_from(&mut *source)? == 0 {
                        return Err(StreamError::Stalled {
                            buffered: buffer.filled(),
                        });
                    }
                }
            }
        };

        let channels = decoder.channels() as usize;
        if channels == 0 {
            return Err(DecodeError::Header("stream declares zero channels".to_string()).into());
        }

        buffer.consume(header_len);

        debug!(
            "Stream opened: {} Hz, {} channels, {} header bytes, {}-byte buffer",
            decoder.sample_rate(),
            channels,
            header_len,
            buffer.size()
        );

        Ok(Self {
            source,
            buffer,
            decoder,
            header_len,
            expected_offset: 0,
            channels,
            pending: None,
            deferred_error: None,
            stats,
        })
    }

    pub fn info(&self) -> AudioSourceInfo {
        AudioSourceInfo::s16(self.decoder.sample_rate(), self.channels as u16)
    }

    /// Bytes consumed by the header parse
    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// Current size of the compressed buffer
    pub fn buffer_size(&self) -> usize {
        self.buffer.size()
    }

    /// PCM bytes delivered so far
    pub fn expected_offset(&self) -> u64 {
        self.expected_offset
    }

    /// Samples per channel still waiting in the current frame
    pub fn pending_samples(&self) -> usize {
        self.pending.map_or(0, |p| p.count - p.index)
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Write decoded PCM into `buf`.
    ///
    /// Only whole frames are written, so `buf` must hold at least one frame.
    /// `offset` is not honored: reads are strictly sequential.
    pub fn read_pcm(&mut self, offset: u64, buf: &mut [u8]) -> Result<PcmRead, StreamError> {
        self.stats.read_calls += 1;

        if let Some(err) = self.deferred_error.take() {
            return Err(err);
        }
        if buf.is_empty() {
            return Ok(PcmRead::Bytes(0));
        }

        let frame_bytes = self.channels * BYTES_PER_SAMPLE;
        if buf.len() < frame_bytes {
            return Err(StreamError::InvalidArgument(format!(
                "a {}-byte read cannot hold one {}-byte PCM frame",
                buf.len(),
                frame_bytes
            )));
        }

        if offset != self.expected_offset {
            debug!(
                "Ignoring read offset {} (stream is at {}); seeking is not supported",
                offset, self.expected_offset
            );
        }

        let mut written = self.drain_pending(buf);

        if buf.len() - written >= frame_bytes {
            match self.decode_frame() {
                Ok(Some(count)) => {
                    self.pending = Some(Pending { index: 0, count });
                    written += self.drain_pending(&mut buf[written..]);
                }
                Ok(None) => trace!("Byte source exhausted at PCM offset {}", self.expected_offset),
                Err(err) if written > 0 => {
                    warn!("Deferring decode error after {} bytes: {}", written, err);
                    self.deferred_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        self.expected_offset += written as u64;
        self.stats.bytes_delivered += written as u64;

        if written == 0 {
            Ok(PcmRead::EndOfSource)
        } else {
            Ok(PcmRead::Bytes(written))
        }
    }

    /// Feed the decoder until it produces a non-empty frame.
    ///
    /// Returns the frame's sample count, or `None` once the source is
    /// exhausted.
    fn decode_frame(&mut self) -> Result<Option<usize>, StreamError> {
        if !self.buffer.is_full() {
            self.buffer.fill_from(&mut *self.source)?;
        }

        loop {
            self.stats.decode_steps += 1;
            match self.decoder.accept(self.buffer.unconsumed())? {
                Feed::Consumed { consumed, samples } if consumed > 0 || samples > 0 => {
                    self.buffer.consume(consumed);
                    if samples > 0 {
                        trace!("Decoded {} samples from {} compressed bytes", samples, consumed);
                        debug_assert_eq!(samples, self.decoder.frame().len());
                        return Ok(Some(samples));
                    }
                }
                _ => {
                    if self.buffer.is_full() {
                        self.buffer.grow()?;
                        self.stats.buffer_growths += 1;
                    }
                    if self.buffer.fill_from(&mut *self.source)? == 0 {
                        return Ok(None);
                    }
                }
            }
        }
    }

    /// Serialize as many whole pending frames as fit into `out`
    fn drain_pending(&mut self, out: &mut [u8]) -> usize {
        let pending = match self.pending.as_mut() {
            Some(pending) => pending,
            None => return 0,
        };

        let frame = self.decoder.frame();
        let frames = (pending.count - pending.index).min(out.len() / (self.channels * BYTES_PER_SAMPLE));

        let mut pos = 0;
        for index in pending.index..pending.index + frames {
            for channel in 0..self.channels {
                let sample = to_i16(frame.sample(channel, index));
                out[pos..pos + BYTES_PER_SAMPLE].copy_from_slice(&sample.to_le_bytes());
                pos += BYTES_PER_SAMPLE;
            }
        }

        pending.index += frames;
        let exhausted = pending.index == pending.count;
        if exhausted {
            self.pending = None;
        }
        pos
    }

    /// Wrap the decoder in an [`AudioSource`]
    pub fn into_source(self) -> AudioSource<'a>
    where
        S: 'a,
        D: 'a,
    {
        let info = self.info();
        AudioSource::new(Box::new(self), info)
    }
}

impl<'a, S: ByteSource + ?Sized, D: PushDecoder> AudioSourceImpl for StreamDecoder<'a, S, D> {
    fn read_pcm(&mut self, offset: u64, buf: &mut [u8]) -> Result<PcmRead, StreamError> {
        StreamDecoder::read_pcm(self, offset, buf)
    }

    fn close(self: Box<Self>) -> Result<(), StreamError> {
        debug!(
            "Closing stream after {} ({}-byte buffer)",
            self.stats.format_summary(),
            self.buffer.size()
        );
        Ok(())
    }
}

/// Scale a float sample to signed 16-bit, clamping out-of-range values
fn to_i16(sample: f32) -> i16 {
    (sample * 32768.0).clamp(-32768.0, 32767.0) as i16
}
