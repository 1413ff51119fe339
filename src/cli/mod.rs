use clap::{Parser, Subcommand};
use log::info;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::audio::decoders::VorbisDecoder;
use crate::audio::growable::BufferLimits;
use crate::audio::stream::{StreamDecoder, StreamStats};
use crate::audio::{BufferedSound, PcmRead};
use crate::error::StreamError;
use crate::io::buffer_remaining;
use crate::models::{AudioCodec, AudioSourceInfo};

pub mod display;
pub use display::StreamDisplay;


/// Incremental Ogg Vorbis decoding CLI
#[derive(Debug, Parser)]
#[command(name = "astream")]
#[command(about = "Decode and buffer Ogg Vorbis audio through the streaming engine")]
#[command(version = "0.1.0")]
pub struct CliApp {
    /// Configuration file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Open a stream and print its format
    Info {
        /// Ogg Vorbis file
        file: PathBuf,
    },
    /// Stream decoded PCM to a raw s16le file
    Decode {
        /// Ogg Vorbis file
        file: PathBuf,
        /// Output file for raw PCM
        #[arg(short, long)]
        output: PathBuf,
        /// Bytes requested per read (defaults to the configured read_size)
        #[arg(long)]
        read_size: Option<usize>,
    },
    /// Decode a whole file into memory in one buffer
    Buffer {
        /// Input file
        file: PathBuf,
        /// Optional file to write the buffered bytes to
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Buffer the file bytes as-is instead of decoding
        #[arg(long)]
        raw: bool,
    },
    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the active configuration
    Show,
    /// Restore and save the default configuration
    Reset,
    /// Print the configuration file location
    Path,
}

impl CliApp {
    /// Parse command line arguments
    pub fn parse() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// Expand tilde (~) in path to home directory
    pub fn expand_path(path: &Path) -> PathBuf {
        let text = path.to_string_lossy();
        if let Some(rest) = text.strip_prefix("~/") {
            if let Some(home_dir) = dirs::home_dir() {
                return home_dir.join(rest);
            }
        } else if text == "~" {
            if let Some(home_dir) = dirs::home_dir() {
                return home_dir;
            }
        }
        path.to_path_buf()
    }
}

/// What `astream info` learned about a stream
#[derive(Debug, Clone, PartialEq)]
pub struct StreamReport {
    pub info: AudioSourceInfo,
    pub header_len: usize,
    pub buffer_size: usize,
    pub vendor: String,
    pub comments: Vec<(String, String)>,
}

/// Result of streaming a file to disk
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeSummary {
    pub info: AudioSourceInfo,
    pub bytes_written: u64,
    pub stats: StreamStats,
}

/// Result of buffering a file
#[derive(Debug, Clone, PartialEq)]
pub struct BufferSummary {
    /// `None` when the raw file bytes were buffered
    pub info: Option<AudioSourceInfo>,
    pub bytes: usize,
}

/// Open `path` as Ogg Vorbis and report its header
pub fn inspect(path: &Path, limits: BufferLimits) -> Result<StreamReport, StreamError> {
    let mut reader = BufReader::new(File::open(path)?);
    let stream = StreamDecoder::<_, VorbisDecoder>::open(&mut reader, limits)?;

    let report = StreamReport {
        info: stream.info(),
        header_len: stream.header_len(),
        buffer_size: stream.buffer_size(),
        vendor: stream.decoder().vendor().to_string(),
        comments: stream.decoder().comments().to_vec(),
    };

    stream.into_source().close()?;
    Ok(report)
}

/// Stream decoded PCM from `input` into `output`, `read_size` bytes at a time
pub fn decode_to_file(
    input: &Path,
    output: &Path,
    limits: BufferLimits,
    read_size: usize,
) -> Result<DecodeSummary, StreamError> {
    if read_size == 0 {
        return Err(StreamError::InvalidArgument("read size must be greater than zero".to_string()));
    }

    let mut reader = BufReader::new(File::open(input)?);
    let mut stream = StreamDecoder::<_, VorbisDecoder>::open(&mut reader, limits)?;
    let info = stream.info();

    let mut writer = BufWriter::new(File::create(output)?);
    let mut buf = vec![0u8; read_size];
    let mut offset = 0u64;

    loop {
        match stream.read_pcm(offset, &mut buf)? {
            PcmRead::Bytes(n) => {
                writer.write_all(&buf[..n])?;
                offset += n as u64;
            }
            PcmRead::EndOfSource => break,
        }
    }
    writer.flush()?;

    let stats = stream.stats();
    stream.into_source().close()?;

    info!("Decoded {} bytes of PCM into {}", offset, output.display());
    Ok(DecodeSummary {
        info,
        bytes_written: offset,
        stats,
    })
}

/// Buffer `input` fully, decoding it unless `raw` is set
pub fn buffer_file(
    input: &Path,
    output: Option<&Path>,
    raw: bool,
    limits: BufferLimits,
) -> Result<BufferSummary, StreamError> {
    let mut reader = BufReader::new(File::open(input)?);

    let (info, bytes) = if raw {
        (None, buffer_remaining(&mut reader)?)
    } else {
        let codec = AudioCodec::from_path(input).ok_or_else(|| {
            StreamError::Unsupported(format!("unrecognized file extension: {}", input.display()))
        })?;
        let source = codec.open(&mut reader, limits)?;
        let sound = BufferedSound::buffer(source)?;
        (Some(*sound.info()), sound.into_pcm())
    };

    if let Some(output) = output {
        std::fs::write(output, &bytes)?;
        info!("Wrote {} buffered bytes to {}", bytes.len(), output.display());
    }

    Ok(BufferSummary {
        info,
        bytes: bytes.len(),
    })
}
