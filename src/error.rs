use thiserror::Error;

/// Main error type for opening, decoding and buffering audio
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Out of memory: could not allocate {requested} bytes")]
    OutOfMemory { requested: usize },

    #[error("Compressed buffer of {size} bytes cannot grow past the {cap}-byte cap")]
    BufferCapExceeded { size: usize, cap: usize },

    #[error("Byte source ran dry with {buffered} bytes buffered while the decoder needs more")]
    Stalled { buffered: usize },

    #[error("Source error: {0}")]
    Source(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Coarse classification of a [`StreamError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    OutOfMemory,
    Io,
    Unsupported,
    InvalidArgument,
    Config,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::OutOfMemory => "OUT_OF_MEMORY",
            ErrorKind::Io => "IO",
            ErrorKind::Unsupported => "UNSUPPORTED",
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::Config => "CONFIG",
        }
    }
}

impl StreamError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StreamError::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            StreamError::BufferCapExceeded { .. }
            | StreamError::Stalled { .. }
            | StreamError::Source(_)
            | StreamError::Decode(_) => ErrorKind::Io,
            StreamError::Unsupported(_) => ErrorKind::Unsupported,
            StreamError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            StreamError::Config(_) => ErrorKind::Config,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            StreamError::OutOfMemory { requested } => {
                format!("Not enough memory to hold {} more bytes of audio data", requested)
            }
            StreamError::BufferCapExceeded { cap, .. } => {
                format!("The stream needs more than {} bytes of buffering and cannot be parsed", cap)
            }
            StreamError::Stalled { .. } => {
                "The audio data ended before a complete header or frame was read".to_string()
            }
            StreamError::Source(err) => Self::format_source_error(err),
            StreamError::Decode(err) => err.user_message(),
            StreamError::Unsupported(what) => format!("Not supported: {}", what),
            StreamError::InvalidArgument(msg) => format!("Invalid request: {}", msg),
            StreamError::Config(err) => err.user_message(),
        }
    }

    /// Get suggested recovery actions for the error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            StreamError::OutOfMemory { .. } => vec![
                "Stream the sound instead of buffering it fully".to_string(),
                "Close other sounds to free memory".to_string(),
            ],
            StreamError::BufferCapExceeded { .. } => vec![
                "Check that the file really is Ogg Vorbis".to_string(),
                "Raise max_buffer_size in the configuration".to_string(),
            ],
            StreamError::Stalled { .. } => vec![
                "Check if the file is completely downloaded".to_string(),
                "Try re-encoding the file".to_string(),
            ],
            StreamError::Source(_) => vec![
                "Check that the file exists and is readable".to_string(),
                "Try the operation again".to_string(),
            ],
            StreamError::Decode(err) => err.recovery_suggestions(),
            StreamError::Unsupported(_) => vec![
                "Supported formats: OGG/Vorbis".to_string(),
                "Convert the file to Ogg Vorbis".to_string(),
            ],
            StreamError::InvalidArgument(_) => vec![
                "Request at least one whole PCM frame per read".to_string(),
            ],
            StreamError::Config(err) => err.recovery_suggestions(),
        }
    }

    /// Check if retrying the failed call can succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            StreamError::OutOfMemory { .. } => true, // Memory may be freed meanwhile
            StreamError::BufferCapExceeded { .. } => false,
            StreamError::Stalled { .. } => true, // Source may deliver more later
            StreamError::Source(err) => err.kind() == std::io::ErrorKind::Interrupted,
            StreamError::Decode(err) => err.is_recoverable(),
            StreamError::Unsupported(_) => false,
            StreamError::InvalidArgument(_) => true,
            StreamError::Config(err) => err.is_recoverable(),
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            StreamError::OutOfMemory { .. } => ErrorSeverity::Critical,
            StreamError::Unsupported(_) => ErrorSeverity::Warning,
            StreamError::InvalidArgument(_) => ErrorSeverity::Warning,
            StreamError::Config(_) => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    fn format_source_error(err: &std::io::Error) -> String {
        match err.kind() {
            std::io::ErrorKind::NotFound => "File or directory not found".to_string(),
            std::io::ErrorKind::PermissionDenied => "Permission denied - cannot access file".to_string(),
            std::io::ErrorKind::UnexpectedEof => "File appears to be truncated or corrupted".to_string(),
            _ => format!("Read error: {}", err),
        }
    }
}

/// Error severity levels for logging and user feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSeverity::Info => "INFO",
            ErrorSeverity::Warning => "WARNING",
            ErrorSeverity::Error => "ERROR",
            ErrorSeverity::Critical => "CRITICAL",
        }
    }

    pub fn log_level(&self) -> log::Level {
        match self {
            ErrorSeverity::Info => log::Level::Info,
            ErrorSeverity::Warning => log::Level::Warn,
            ErrorSeverity::Error => log::Level::Error,
            ErrorSeverity::Critical => log::Level::Error,
        }
    }
}

/// Container and codec errors raised while parsing compressed data
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Ogg container error: {0}")]
    Container(String),

    #[error("Vorbis header error: {0}")]
    Header(String),

    #[error("Vorbis packet error: {0}")]
    Packet(String),
}

impl From<lewton::header::HeaderReadError> for DecodeError {
    fn from(err: lewton::header::HeaderReadError) -> Self {
        DecodeError::Header(err.to_string())
    }
}

impl From<lewton::audio::AudioReadError> for DecodeError {
    fn from(err: lewton::audio::AudioReadError) -> Self {
        DecodeError::Packet(err.to_string())
    }
}

impl DecodeError {
    pub fn user_message(&self) -> String {
        match self {
            DecodeError::Container(msg) => {
                format!("Audio file is not a valid Ogg stream: {}", msg)
            }
            DecodeError::Header(msg) => {
                format!("Audio file has a damaged Vorbis header: {}", msg)
            }
            DecodeError::Packet(msg) => {
                format!("Failed to decode audio data: {}", msg)
            }
        }
    }

    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            DecodeError::Container(_) => vec![
                "Check if the file extension matches the actual format".to_string(),
                "Try re-downloading or re-copying the file".to_string(),
            ],
            DecodeError::Header(_) | DecodeError::Packet(_) => vec![
                "Try re-encoding the file".to_string(),
                "Verify the file is not corrupted".to_string(),
            ],
        }
    }

    pub fn is_recoverable(&self) -> bool {
        false // Corrupt data stays corrupt
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found")]
    ConfigDirNotFound,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] toml::ser::Error),

    #[error("Deserialization error: {0}")]
    DeserializationError(#[from] toml::de::Error),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

impl ConfigError {
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::ConfigDirNotFound => {
                "Cannot find or create configuration directory".to_string()
            }
            ConfigError::IoError(err) => {
                format!("Cannot access configuration file: {}", err)
            }
            ConfigError::SerializationError(_) => {
                "Failed to save configuration settings".to_string()
            }
            ConfigError::DeserializationError(_) => {
                "Configuration file is corrupted or has invalid format".to_string()
            }
            ConfigError::InvalidValue(msg) => {
                format!("Configuration value rejected: {}", msg)
            }
        }
    }

    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ConfigError::ConfigDirNotFound => vec![
                "Check that you have write permissions to your home directory".to_string(),
                "Pass an explicit file with --config <path>".to_string(),
            ],
            ConfigError::IoError(_) => vec![
                "Check file permissions for the configuration directory".to_string(),
                "Ensure the disk is not full".to_string(),
            ],
            ConfigError::SerializationError(_) => vec![
                "Try resetting configuration to defaults".to_string(),
            ],
            ConfigError::DeserializationError(_) => vec![
                "Delete the configuration file to reset to defaults".to_string(),
                "Check the configuration file format manually".to_string(),
            ],
            ConfigError::InvalidValue(_) => vec![
                "min_buffer_size must be non-zero and not larger than max_buffer_size".to_string(),
                "Run 'astream config reset' to restore defaults".to_string(),
            ],
        }
    }

    pub fn is_recoverable(&self) -> bool {
        true // Defaults are always available
    }
}
