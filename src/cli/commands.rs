//! CLI command implementation
//!
//! Resolves configuration, optionally starts the status thread, runs the
//! shuffle and writes the JSON response.

use std::sync::Arc;

use serde_json::json;

use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::shuffle::{shuffle_file, ShuffleConfig, ShuffleProgress};

use super::args::Cli;
use super::errors::{CliError, CliResult};
use super::io::write_response;
use super::status::spawn_status_reporter;

/// Main CLI entry point
///
/// Parses arguments and runs the shuffle. This is the only function that
/// main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(&cli)
}

/// Run a shuffle described by parsed arguments
pub fn run_command(cli: &Cli) -> CliResult<()> {
    if cli.quiet {
        Logger::set_min_severity(Severity::Error);
    }

    let result = shuffle(cli);
    if let Err(e) = &result {
        log_event_with_fields(
            Event::RunFailed,
            &[("code", e.code_str()), ("reason", e.message())],
        );
    }
    result
}

/// Shuffle `cli.input` into `cli.output`
pub fn shuffle(cli: &Cli) -> CliResult<()> {
    let config = resolve_config(cli)?;

    let progress = Arc::new(ShuffleProgress::new());
    if cli.status {
        spawn_status_reporter(Arc::clone(&progress))
            .map_err(|e| CliError::io_error(format!("Failed to start status thread: {}", e)))?;
    }

    let report = shuffle_file(&cli.input, &cli.output, &config, &progress)?;

    write_response(json!({
        "message": format!("Finished! Output file saved to: {}", report.output.display()),
        "report": report,
    }))
}

/// Build the run configuration.
///
/// Precedence: command-line flag, then config file, then default.
pub fn resolve_config(cli: &Cli) -> CliResult<ShuffleConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let config = ShuffleConfig::load(path)?;
            let path_str = path.display().to_string();
            log_event_with_fields(Event::ConfigLoaded, &[("path", path_str.as_str())]);
            config
        }
        None => ShuffleConfig::default(),
    };

    if let Some(chunk_size) = cli.chunk_size {
        config.chunk_size = usize::try_from(chunk_size).map_err(|_| {
            CliError::config_error(format!("chunk size {} is too large", chunk_size))
        })?;
    }
    if let Some(temp_dir) = &cli.temp_dir {
        config.temp_dir = Some(temp_dir.clone());
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }

    config.validate()?;
    Ok(config)
}
