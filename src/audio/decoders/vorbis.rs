//! Ogg Vorbis push decoder built on lewton's packet-level API.
//!
//! Each `accept` call consumes exactly one Ogg page and decodes every audio
//! packet that page completes. Pages that only start a packet, and the first
//! audio packet of a stream, legitimately produce no samples.

use lewton::audio::{read_audio_packet_generic, PreviousWindowRight};
use lewton::header::{read_header_comment, read_header_ident, read_header_setup, CommentHeader, IdentHeader, SetupHeader};
use log::{debug, trace};

use super::ogg::{parse_page, PacketAssembler};
use super::{Feed, FrameView, Opened, PushDecoder};
use crate::error::{DecodeError, StreamError};

pub struct VorbisDecoder {
    ident: IdentHeader,
    comment: CommentHeader,
    setup: SetupHeader,
    assembler: PacketAssembler,
    pwr: PreviousWindowRight,
    packets: Vec<Vec<u8>>,
    planes: Vec<Vec<f32>>,
}

impl VorbisDecoder {
    /// Encoder vendor string from the comment header
    pub fn vendor(&self) -> &str {
        &self.comment.vendor
    }

    /// User comments as `(key, value)` pairs
    pub fn comments(&self) -> &[(String, String)] {
        &self.comment.comment_list
    }

    /// Whether the end-of-stream page has been decoded
    pub fn is_finished(&self) -> bool {
        self.assembler.is_finished()
    }
}

impl PushDecoder for VorbisDecoder {
    fn open(data: &[u8]) -> Result<Opened<Self>, StreamError> {
        let mut assembler = PacketAssembler::new();
        let mut packets = Vec::new();
        let mut ident = None;
        let mut offset = 0;

        while packets.len() < 3 {
            let page = match parse_page(&data[offset..])? {
                Some(page) => page,
                None => return Ok(Opened::NeedMore),
            };
            assembler.push_page(&page, &mut packets)?;
            offset += page.len();

            // Reject non-Vorbis streams before buffering the rest of the header
            if ident.is_none() {
                if let Some(first) = packets.first() {
                    ident = Some(read_header_ident(first).map_err(DecodeError::from)?);
                }
            }
        }

        if packets.len() > 3 || assembler.has_partial() {
            return Err(DecodeError::Header("audio data shares a page with the setup header".to_string()).into());
        }

        let ident = ident.ok_or_else(|| DecodeError::Header("missing identification header".to_string()))?;
        let comment = read_header_comment(&packets[1]).map_err(DecodeError::from)?;
        let setup = read_header_setup(&packets[2], ident.audio_channels, (ident.blocksize_0, ident.blocksize_1))
            .map_err(DecodeError::from)?;

        debug!(
            "Vorbis stream: {} Hz, {} channels, vendor '{}', {} header bytes",
            ident.audio_sample_rate, ident.audio_channels, comment.vendor, offset
        );

        let planes = vec![Vec::new(); ident.audio_channels as usize];
        packets.clear();

        Ok(Opened::Ready {
            decoder: Self {
                ident,
                comment,
                setup,
                assembler,
                pwr: PreviousWindowRight::new(),
                packets,
                planes,
            },
            header_len: offset,
        })
    }

    fn sample_rate(&self) -> u32 {
        self.ident.audio_sample_rate
    }

    fn channels(&self) -> u16 {
        self.ident.audio_channels as u16
    }

    fn accept(&mut self, data: &[u8]) -> Result<Feed, StreamError> {
        let page = match parse_page(data)? {
            Some(page) => page,
            None => return Ok(Feed::NeedMore),
        };

        self.packets.clear();
        self.assembler.push_page(&page, &mut self.packets)?;

        for plane in &mut self.planes {
            plane.clear();
        }

        for packet in self.packets.drain(..) {
            if packet.is_empty() {
                continue;
            }
            let decoded: Vec<Vec<f32>> =
                read_audio_packet_generic(&self.ident, &self.setup, &packet, &mut self.pwr)
                    .map_err(DecodeError::from)?;
            for (plane, samples) in self.planes.iter_mut().zip(decoded) {
                plane.extend_from_slice(&samples);
            }
        }

        let samples = self.planes.first().map_or(0, Vec::len);
        trace!("Ogg page {}: {} bytes -> {} samples", page.sequence(), page.len(), samples);

        Ok(Feed::Consumed {
            consumed: page.len(),
            samples,
        })
    }

    fn frame(&self) -> FrameView<'_> {
        FrameView::new(&self.planes)
    }
}
