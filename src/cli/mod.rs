//! Command-line interface for chunkshuf
//!
//! `chunkshuf INPUT OUTPUT` shuffles INPUT into OUTPUT and prints a JSON
//! response with the run report.

mod args;
mod commands;
mod errors;
mod io;
mod status;

pub use args::Cli;
pub use commands::{resolve_config, run, run_command, shuffle};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
pub use status::spawn_status_reporter;
