use log::{debug, info, log, Level, LevelFilter};
use std::time::{Duration, Instant};

use crate::error::StreamError;

/// Environment variable consulted when no level is given on the command line
pub const LOG_LEVEL_ENV: &str = "AUDIO_STREAMER_LOG_LEVEL";

/// Parse a level name, ignoring case
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.trim().to_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// Pick the effective level: command line, then environment, then config.
///
/// Unparseable names fall through to the next source; `Warn` is the last
/// resort.
pub fn resolve_level(cli: Option<&str>, env: Option<&str>, config: &str) -> LevelFilter {
    [cli, env, Some(config)]
        .into_iter()
        .flatten()
        .find_map(parse_level)
        .unwrap_or(LevelFilter::Warn)
}

/// Initialize logging system with appropriate log level
pub fn init_logging(cli_level: Option<&str>, config_level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let env_level = std::env::var(LOG_LEVEL_ENV).ok();
    let level = resolve_level(cli_level, env_level.as_deref(), config_level);

    let mut builder = env_logger::Builder::new();

    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(
            buf,
            "{} [{}] [{}:{}] {}",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.file().unwrap_or("unknown"),
            record.line().unwrap_or(0),
            record.args()
        )
    });
    builder.filter_level(level);
    builder.try_init()?;

    info!("Logging initialized with level: {}", level);
    Ok(())
}

/// Log an error at the level its severity calls for
pub fn log_stream_error(context: &str, err: &StreamError) {
    let severity = err.severity();
    log!(
        severity.log_level(),
        "[{}] {}: {} (kind: {})",
        severity.as_str(),
        context,
        err,
        err.kind().as_str()
    );
}

/// Wall-clock time of one command, logged when stopped
pub struct Stopwatch {
    label: &'static str,
    started: Instant,
}

impl Stopwatch {
    pub fn start(label: &'static str) -> Self {
        debug!("{} started", label);
        Self {
            label,
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Log the elapsed time at `debug`, or at `warn` past `slow_after`
    pub fn stop(self, slow_after: Option<Duration>) -> Duration {
        let elapsed = self.elapsed();
        let level = match slow_after {
            Some(limit) if elapsed > limit => Level::Warn,
            _ => Level::Debug,
        };
        log!(level, "{} finished in {}", self.label, format_elapsed(elapsed));
        elapsed
    }
}

/// Run `work` under a [`Stopwatch`]
pub fn timed<T>(label: &'static str, slow_after: Option<Duration>, work: impl FnOnce() -> T) -> T {
    let stopwatch = Stopwatch::start(label);
    let result = work();
    stopwatch.stop(slow_after);
    result
}

/// Milliseconds below one second, seconds with millisecond precision above
fn format_elapsed(elapsed: Duration) -> String {
    if elapsed < Duration::from_secs(1) {
        format!("{}ms", elapsed.as_millis())
    } else {
        format!("{:.3}s", elapsed.as_secs_f64())
    }
}
