//! A byte-driven codec for exercising the streaming engine.
//!
//! Header: `TSTC`, channel count (u8), sample rate (u32 LE), total header
//! length (u32 LE) followed by padding up to that length.
//!
//! Frame: total frame length (u32 LE), samples per channel (u32 LE), planar
//! f32 LE samples, then padding up to the frame length. A frame length of
//! zero marks a corrupt frame.

use crate::audio::decoders::{Feed, FrameView, Opened, PushDecoder};
use crate::error::{DecodeError, StreamError};

const MAGIC: &[u8; 4] = b"TSTC";
const MIN_HEADER_LEN: usize = 13;
const FRAME_PREFIX_LEN: usize = 8;

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

pub struct TestCodec {
    sample_rate: u32,
    channels: u16,
    planes: Vec<Vec<f32>>,
}

impl PushDecoder for TestCodec {
    fn open(data: &[u8]) -> Result<Opened<Self>, StreamError> {
        let magic_len = data.len().min(MAGIC.len());
        if data[..magic_len] != MAGIC[..magic_len] {
            return Err(DecodeError::Header("bad magic".to_string()).into());
        }
        if data.len() < MIN_HEADER_LEN {
            return Ok(Opened::NeedMore);
        }

        let header_len = read_u32(&data[9..13]) as usize;
        if header_len < MIN_HEADER_LEN {
            return Err(DecodeError::Header("header length too small".to_string()).into());
        }
        if data.len() < header_len {
            return Ok(Opened::NeedMore);
        }

        let channels = data[4] as u16;
        Ok(Opened::Ready {
            decoder: TestCodec {
                sample_rate: read_u32(&data[5..9]),
                channels,
                planes: vec![Vec::new(); channels as usize],
            },
            header_len,
        })
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn accept(&mut self, data: &[u8]) -> Result<Feed, StreamError> {
        if data.len() < FRAME_PREFIX_LEN {
            return Ok(Feed::NeedMore);
        }

        let frame_len = read_u32(&data[0..4]) as usize;
        let samples = read_u32(&data[4..8]) as usize;
        let payload_len = samples * self.channels as usize * 4;
        if frame_len < FRAME_PREFIX_LEN + payload_len {
            return Err(DecodeError::Packet("corrupt frame".to_string()).into());
        }
        if data.len() < frame_len {
            return Ok(Feed::NeedMore);
        }

        let mut pos = FRAME_PREFIX_LEN;
        for plane in &mut self.planes {
            plane.clear();
            for _ in 0..samples {
                plane.push(f32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]));
                pos += 4;
            }
        }

        Ok(Feed::Consumed {
            consumed: frame_len,
            samples,
        })
    }

    fn frame(&self) -> FrameView<'_> {
        FrameView::new(&self.planes)
    }
}

/// Assembles test streams
pub struct StreamBuilder {
    channels: usize,
    bytes: Vec<u8>,
}

impl StreamBuilder {
    pub fn new(channels: u8, sample_rate: u32) -> Self {
        Self::with_header_len(channels, sample_rate, MIN_HEADER_LEN)
    }

    /// Header padded to `header_len` bytes
    pub fn with_header_len(channels: u8, sample_rate: u32, header_len: usize) -> Self {
        let mut bytes = Vec::with_capacity(header_len);
        bytes.extend_from_slice(MAGIC);
        bytes.push(channels);
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(header_len as u32).to_le_bytes());
        bytes.resize(header_len.max(MIN_HEADER_LEN), 0);
        Self {
            channels: channels as usize,
            bytes,
        }
    }

    /// Frame carrying `planes` (one vector per channel)
    pub fn frame(self, planes: &[Vec<f32>]) -> Self {
        self.padded_frame(planes, 0)
    }

    pub fn padded_frame(mut self, planes: &[Vec<f32>], padding: usize) -> Self {
        assert_eq!(planes.len(), self.channels);
        let samples = planes.first().map_or(0, Vec::len);
        let frame_len = FRAME_PREFIX_LEN + samples * self.channels * 4 + padding;

        self.bytes.extend_from_slice(&(frame_len as u32).to_le_bytes());
        self.bytes.extend_from_slice(&(samples as u32).to_le_bytes());
        for plane in planes {
            for sample in plane {
                self.bytes.extend_from_slice(&sample.to_le_bytes());
            }
        }
        self.bytes.resize(self.bytes.len() + padding, 0);
        self
    }

    /// Frame of `samples` deterministic samples per channel
    pub fn ramp_frame(self, samples: usize) -> Self {
        let planes = ramp_planes(self.channels, samples, self.bytes.len());
        self.frame(&planes)
    }

    pub fn corrupt_frame(mut self) -> Self {
        self.bytes.extend_from_slice(&[0; FRAME_PREFIX_LEN]);
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// Distinct, in-range sample values seeded by `seed`
pub fn ramp_planes(channels: usize, samples: usize, seed: usize) -> Vec<Vec<f32>> {
    (0..channels)
        .map(|channel| {
            (0..samples)
                .map(|i| {
                    let step = (seed + i * 7 + channel * 131) % 2001;
                    step as f32 / 1000.0 - 1.0
                })
                .collect()
        })
        .collect()
}

/// Expected s16le output for planar samples
pub fn expected_pcm(planes: &[Vec<f32>]) -> Vec<u8> {
    let samples = planes.first().map_or(0, Vec::len);
    let mut out = Vec::with_capacity(samples * planes.len() * 2);
    for i in 0..samples {
        for plane in planes {
            let value = (plane[i] * 32768.0).clamp(-32768.0, 32767.0) as i16;
            out.extend_from_slice(&value.to_le_bytes());
        }
    }
    out
}
