use audio_streamer::cli::{self, CliApp, Commands, ConfigAction, StreamDisplay};
use audio_streamer::config::ConfigManager;
use audio_streamer::error::StreamError;
use audio_streamer::logging::{init_logging, log_stream_error, timed};
use log::{debug, info};
use std::time::Duration;

/// Slow enough to be worth a warning in the log
const SLOW_COMMAND_THRESHOLD: Duration = Duration::from_secs(10);

/// Runs one parsed command against the loaded configuration
struct AppController {
    config_manager: ConfigManager,
}

impl AppController {
    fn new(cli: &CliApp) -> Result<Self, StreamError> {
        let config_manager = match &cli.config {
            Some(path) => ConfigManager::with_path(CliApp::expand_path(path))?,
            None => ConfigManager::new()?,
        };
        Ok(Self { config_manager })
    }

    fn run(&mut self, command: Commands) -> Result<(), StreamError> {
        let config = self.config_manager.get_config().clone();

        match command {
            Commands::Info { file } => {
                let file = CliApp::expand_path(&file);
                let limits = config.limits()?;
                let report = timed("info", None, || cli::inspect(&file, limits))?;
                StreamDisplay::display_report(&report);
            }
            Commands::Decode { file, output, read_size } => {
                let file = CliApp::expand_path(&file);
                let output = CliApp::expand_path(&output);
                let read_size = read_size.unwrap_or(config.read_size);
                let limits = config.limits()?;
                let summary = timed("decode", Some(SLOW_COMMAND_THRESHOLD), || {
                    cli::decode_to_file(&file, &output, limits, read_size)
                })?;
                StreamDisplay::display_decode_summary(&summary);
            }
            Commands::Buffer { file, output, raw } => {
                let file = CliApp::expand_path(&file);
                let output = output.map(|path| CliApp::expand_path(&path));
                let limits = config.limits()?;
                let summary = timed("buffer", Some(SLOW_COMMAND_THRESHOLD), || {
                    cli::buffer_file(&file, output.as_deref(), raw, limits)
                })?;
                StreamDisplay::display_buffer_summary(&summary);
            }
            Commands::Config { action } => match action {
                ConfigAction::Show => StreamDisplay::display_config(&config),
                ConfigAction::Reset => {
                    self.config_manager.reset_to_defaults()?;
                    info!("Configuration reset to defaults");
                    println!("Configuration reset: {}", self.config_manager.config_path().display());
                }
                ConfigAction::Path => println!("{}", self.config_manager.config_path().display()),
            },
        }

        Ok(())
    }
}

fn main() {
    let cli = CliApp::parse();

    let mut app = match AppController::new(&cli) {
        Ok(app) => app,
        Err(e) => {
            // Logging is not up yet, so report straight to the terminal
            let _ = init_logging(cli.log_level.as_deref(), "warn");
            StreamDisplay::display_error(&e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(cli.log_level.as_deref(), &app.config_manager.get_config().log_level) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }
    debug!("Running {:?}", cli.command);

    if let Err(e) = app.run(cli.command) {
        log_stream_error("command failed", &e);
        StreamDisplay::display_error(&e);
        std::process::exit(1);
    }
}
