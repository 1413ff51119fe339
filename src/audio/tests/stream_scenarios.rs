use std::io::Cursor;

use super::alloc_counter::net_allocation;
use super::test_codec::{expected_pcm, ramp_planes, StreamBuilder, TestCodec};
use crate::audio::growable::BufferLimits;
use crate::audio::source::PcmRead;
use crate::audio::stream::StreamDecoder;
use crate::audio::BufferedSound;
use crate::error::{DecodeError, StreamError};
use crate::io::ByteSource;

type TestStream<'a> = StreamDecoder<'a, Cursor<Vec<u8>>, TestCodec>;

fn open(cursor: &mut Cursor<Vec<u8>>) -> Result<TestStream<'_>, StreamError> {
    StreamDecoder::open(cursor, BufferLimits::default())
}

/// Read everything with `read_size`-byte requests
fn drain(stream: &mut TestStream<'_>, read_size: usize) -> Vec<u8> {
    let mut out = Vec::new();
    let mut buf = vec![0u8; read_size];
    loop {
        match stream.read_pcm(out.len() as u64, &mut buf).unwrap() {
            PcmRead::Bytes(n) => out.extend_from_slice(&buf[..n]),
            PcmRead::EndOfSource => return out,
        }
    }
}

/// Records the size of every pull
struct RecordingSource {
    inner: Cursor<Vec<u8>>,
    requests: Vec<usize>,
}

impl ByteSource for RecordingSource {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        self.requests.push(buf.len());
        self.inner.read_bytes(buf)
    }
}

#[test]
fn test_open_reports_format() {
    let mut cursor = Cursor::new(StreamBuilder::new(2, 44100).ramp_frame(16).build());
    let stream = open(&mut cursor).unwrap();

    let info = stream.info();
    assert_eq!(info.frequency_hz, 44100);
    assert_eq!(info.channel_count, 2);
    assert_eq!(info.bits_per_sample, 16);
    assert_eq!(stream.header_len(), 13);
    assert_eq!(stream.buffer_size(), 4096);
    assert_eq!(stream.stats().buffer_growths, 0);
}

#[test]
fn test_large_header_grows_buffer() {
    let data = StreamBuilder::with_header_len(1, 22050, 10_000).ramp_frame(8).build();
    let mut cursor = Cursor::new(data);
    let stream = open(&mut cursor).unwrap();

    assert_eq!(stream.header_len(), 10_000);
    assert_eq!(stream.buffer_size(), 16384);
    assert_eq!(stream.stats().buffer_growths, 2);
}

#[test]
fn test_pathological_header_hits_cap() {
    let data = StreamBuilder::with_header_len(2, 44100, 1_000_000).build();
    let mut source = RecordingSource {
        inner: Cursor::new(data),
        requests: Vec::new(),
    };

    match StreamDecoder::<_, TestCodec>::open(&mut source, BufferLimits::default()) {
        Err(StreamError::BufferCapExceeded { size, cap }) => {
            assert_eq!(size, 131072);
            assert_eq!(cap, 176400);
        }
        Err(other) => panic!("Expected BufferCapExceeded, got {}", other),
        Ok(_) => panic!("Expected BufferCapExceeded"),
    }

    // 4096 -> 8192 -> ... -> 131072, each pull filling the new space
    assert_eq!(source.requests, vec![4096, 4096, 8192, 16384, 32768, 65536]);
}

#[test]
fn test_custom_limits_cap() {
    let data = StreamBuilder::with_header_len(1, 8000, 20_000).build();
    let mut cursor = Cursor::new(data);
    let limits = BufferLimits::new(4096, 10_000).unwrap();

    match StreamDecoder::<_, TestCodec>::open(&mut cursor, limits) {
        Err(StreamError::BufferCapExceeded { size, cap }) => {
            assert_eq!(size, 8192);
            assert_eq!(cap, 10_000);
        }
        Err(other) => panic!("Expected BufferCapExceeded, got {}", other),
        Ok(_) => panic!("Expected BufferCapExceeded"),
    }
}

#[test]
fn test_failed_open_leaks_nothing() {
    let data = StreamBuilder::with_header_len(2, 44100, 1_000_000).build();
    let net = net_allocation(|| {
        let mut cursor = Cursor::new(data.clone());
        let result = open(&mut cursor);
        assert!(matches!(result, Err(StreamError::BufferCapExceeded { .. })));
    });
    assert_eq!(net, 0);
}

#[test]
fn test_truncated_header_stalls() {
    let mut data = StreamBuilder::with_header_len(2, 44100, 100).build();
    data.truncate(40);
    let mut cursor = Cursor::new(data);

    match open(&mut cursor) {
        Err(StreamError::Stalled { buffered }) => assert_eq!(buffered, 40),
        Err(other) => panic!("Expected Stalled, got {}", other),
        Ok(_) => panic!("Expected Stalled"),
    }

    let mut empty = Cursor::new(Vec::new());
    assert!(matches!(open(&mut empty), Err(StreamError::Stalled { buffered: 0 })));
}

#[test]
fn test_bad_header_is_decode_error() {
    let mut cursor = Cursor::new(b"RIFF....WAVE".to_vec());
    assert!(matches!(
        open(&mut cursor),
        Err(StreamError::Decode(DecodeError::Header(_)))
    ));

    let mut cursor = Cursor::new(StreamBuilder::new(0, 44100).build());
    assert!(matches!(
        open(&mut cursor),
        Err(StreamError::Decode(DecodeError::Header(_)))
    ));
}

#[test]
fn test_reads_whole_stream() {
    let first = ramp_planes(2, 100, 1);
    let second = ramp_planes(2, 37, 2);
    let data = StreamBuilder::new(2, 44100).frame(&first).frame(&second).build();
    let mut cursor = Cursor::new(data);
    let mut stream = open(&mut cursor).unwrap();

    let mut expected = expected_pcm(&first);
    expected.extend(expected_pcm(&second));

    assert_eq!(drain(&mut stream, 1 << 20), expected);
    assert_eq!(stream.expected_offset(), expected.len() as u64);
    assert_eq!(stream.stats().bytes_delivered, expected.len() as u64);
}

#[test]
fn test_large_and_tiny_reads_match() {
    let data = StreamBuilder::new(2, 44100)
        .ramp_frame(512)
        .ramp_frame(1)
        .ramp_frame(2000)
        .ramp_frame(300)
        .build();

    let mut cursor = Cursor::new(data.clone());
    let large = drain(&mut open(&mut cursor).unwrap(), 1 << 20);

    for read_size in [4, 6, 12, 1000] {
        let mut cursor = Cursor::new(data.clone());
        let small = drain(&mut open(&mut cursor).unwrap(), read_size);
        assert_eq!(small, large, "read size {}", read_size);
    }
    assert_eq!(large.len(), (512 + 1 + 2000 + 300) * 4);
}

#[test]
fn test_partial_frame_read_keeps_remainder() {
    let planes = ramp_planes(2, 512, 0);
    let data = StreamBuilder::new(2, 44100).frame(&planes).ramp_frame(64).build();
    let mut cursor = Cursor::new(data);
    let mut stream = open(&mut cursor).unwrap();
    let expected = expected_pcm(&planes);

    let mut buf = [0u8; 12];
    assert_eq!(stream.read_pcm(0, &mut buf).unwrap(), PcmRead::Bytes(12));
    assert_eq!(&buf[..], &expected[..12]);
    assert_eq!(stream.pending_samples(), 509);

    let steps = stream.stats().decode_steps;
    assert_eq!(stream.read_pcm(12, &mut buf).unwrap(), PcmRead::Bytes(12));
    assert_eq!(&buf[..], &expected[12..24]);
    assert_eq!(stream.stats().decode_steps, steps);
    assert_eq!(stream.pending_samples(), 506);
}

#[test]
fn test_odd_sized_read_writes_whole_frames() {
    let planes = ramp_planes(2, 10, 3);
    let data = StreamBuilder::new(2, 44100).frame(&planes).build();
    let mut cursor = Cursor::new(data);
    let mut stream = open(&mut cursor).unwrap();

    let mut buf = [0u8; 7];
    assert_eq!(stream.read_pcm(0, &mut buf).unwrap(), PcmRead::Bytes(4));
    assert_eq!(stream.pending_samples(), 9);
}

#[test]
fn test_zero_sample_frames_are_skipped() {
    let planes = ramp_planes(1, 5, 9);
    let data = StreamBuilder::new(1, 8000)
        .frame(&[Vec::new()])
        .frame(&[Vec::new()])
        .frame(&planes)
        .build();
    let mut cursor = Cursor::new(data);
    let mut stream = open(&mut cursor).unwrap();

    let mut buf = [0u8; 64];
    assert_eq!(stream.read_pcm(0, &mut buf).unwrap(), PcmRead::Bytes(10));
    assert_eq!(&buf[..10], &expected_pcm(&planes)[..]);
    assert_eq!(stream.stats().decode_steps, 3);
}

#[test]
fn test_steady_state_growth() {
    // one 12008-byte frame needs a 16384-byte buffer
    let planes = ramp_planes(1, 3000, 5);
    let data = StreamBuilder::new(1, 44100).frame(&planes).build();
    let mut cursor = Cursor::new(data);
    let mut stream = open(&mut cursor).unwrap();
    assert_eq!(stream.buffer_size(), 4096);

    assert_eq!(drain(&mut stream, 8192), expected_pcm(&planes));
    assert_eq!(stream.buffer_size(), 16384);
    assert_eq!(stream.stats().buffer_growths, 2);
}

#[test]
fn test_steady_state_cap() {
    let data = StreamBuilder::new(1, 44100)
        .padded_frame(&ramp_planes(1, 4, 0), 200_000)
        .build();
    let mut cursor = Cursor::new(data);
    let mut stream = open(&mut cursor).unwrap();

    let mut buf = [0u8; 64];
    match stream.read_pcm(0, &mut buf) {
        Err(StreamError::BufferCapExceeded { size, cap }) => {
            assert_eq!(size, 131072);
            assert_eq!(cap, 176400);
        }
        other => panic!("Expected BufferCapExceeded, got {:?}", other),
    }
    assert!(stream.into_source().close().is_ok());
}

#[test]
fn test_trailing_partial_frame_ends_stream() {
    let planes = ramp_planes(2, 20, 4);
    let data = StreamBuilder::new(2, 44100)
        .frame(&planes)
        .raw(&[0x40, 0x00, 0x00])
        .build();
    let mut cursor = Cursor::new(data);
    let mut stream = open(&mut cursor).unwrap();

    assert_eq!(drain(&mut stream, 4096), expected_pcm(&planes));
    let mut buf = [0u8; 16];
    assert_eq!(stream.read_pcm(80, &mut buf).unwrap(), PcmRead::EndOfSource);
}

#[test]
fn test_out_of_range_samples_clamp() {
    let planes = vec![vec![2.0, -2.0, 0.5, -1.0]];
    let data = StreamBuilder::new(1, 8000).frame(&planes).build();
    let mut cursor = Cursor::new(data);
    let mut stream = open(&mut cursor).unwrap();

    let mut buf = [0u8; 8];
    assert_eq!(stream.read_pcm(0, &mut buf).unwrap(), PcmRead::Bytes(8));

    let samples: Vec<i16> = buf
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    assert_eq!(samples, vec![32767, -32768, 16384, -32768]);
}

#[test]
fn test_error_after_progress_is_deferred() {
    let planes = ramp_planes(1, 10, 6);
    let data = StreamBuilder::new(1, 8000).frame(&planes).corrupt_frame().build();
    let mut cursor = Cursor::new(data);
    let mut stream = open(&mut cursor).unwrap();
    let expected = expected_pcm(&planes);

    let mut small = [0u8; 8];
    assert_eq!(stream.read_pcm(0, &mut small).unwrap(), PcmRead::Bytes(8));

    let mut large = [0u8; 100];
    assert_eq!(stream.read_pcm(8, &mut large).unwrap(), PcmRead::Bytes(12));
    assert_eq!(&large[..12], &expected[8..]);

    assert!(matches!(
        stream.read_pcm(20, &mut large),
        Err(StreamError::Decode(DecodeError::Packet(_)))
    ));
}

#[test]
fn test_error_without_progress_is_immediate() {
    let data = StreamBuilder::new(1, 8000).corrupt_frame().build();
    let mut cursor = Cursor::new(data);
    let mut stream = open(&mut cursor).unwrap();

    let mut buf = [0u8; 100];
    assert!(matches!(stream.read_pcm(0, &mut buf), Err(StreamError::Decode(_))));
}

#[test]
fn test_degenerate_requests() {
    let data = StreamBuilder::new(2, 44100).ramp_frame(4).build();
    let mut cursor = Cursor::new(data);
    let mut stream = open(&mut cursor).unwrap();

    assert_eq!(stream.read_pcm(0, &mut []).unwrap(), PcmRead::Bytes(0));
    assert_eq!(stream.stats().decode_steps, 0);

    let mut short = [0u8; 3];
    assert!(matches!(
        stream.read_pcm(0, &mut short),
        Err(StreamError::InvalidArgument(_))
    ));
    assert_eq!(stream.stats().decode_steps, 0);
}

#[test]
fn test_offset_is_ignored() {
    let data = StreamBuilder::new(1, 8000).ramp_frame(50).build();

    let mut cursor = Cursor::new(data.clone());
    let sequential = drain(&mut open(&mut cursor).unwrap(), 20);

    let mut cursor = Cursor::new(data);
    let mut stream = open(&mut cursor).unwrap();
    let mut out = Vec::new();
    let mut buf = [0u8; 20];
    while let PcmRead::Bytes(n) = stream.read_pcm(999_999, &mut buf).unwrap() {
        out.extend_from_slice(&buf[..n]);
    }
    assert_eq!(out, sequential);
}

#[test]
fn test_close_releases_everything() {
    let data = StreamBuilder::new(2, 44100).ramp_frame(3000).ramp_frame(100).build();
    let net = net_allocation(|| {
        let mut cursor = Cursor::new(data.clone());
        let mut source = open(&mut cursor).unwrap().into_source();
        let mut buf = [0u8; 256];
        source.read_pcm(0, &mut buf).unwrap();
        source.close().unwrap();
    });
    assert_eq!(net, 0);
}

#[test]
fn test_audio_source_wrapper() {
    let planes = ramp_planes(2, 64, 8);
    let data = StreamBuilder::new(2, 32000).frame(&planes).build();
    let mut cursor = Cursor::new(data);
    let source = open(&mut cursor).unwrap().into_source();

    assert_eq!(source.info().frequency_hz, 32000);
    let sound = BufferedSound::buffer(source).unwrap();
    assert_eq!(sound.pcm(), &expected_pcm(&planes)[..]);
    assert_eq!(sound.frames(), 64);
}

#[test]
fn test_byte_source_outlives_stream() {
    let data = StreamBuilder::new(1, 8000).ramp_frame(4).raw(b"tail").build();
    let mut cursor = Cursor::new(data);
    {
        let mut stream = open(&mut cursor).unwrap();
        drain(&mut stream, 64);
    }
    // the stream never closes the source it borrowed
    assert_eq!(cursor.position() as usize, cursor.get_ref().len());
}
