//! CLI argument definitions using clap
//!
//! chunkshuf <INPUT> <OUTPUT> [--chunk-size N] [--config PATH]
//!           [--temp-dir DIR] [--seed N] [--status] [--quiet]

use clap::Parser;
use std::path::PathBuf;

/// Shuffle a large line-oriented file by splitting it into shuffled chunks
/// and merging them in random order.
#[derive(Parser, Debug)]
#[command(name = "chunkshuf")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the input file
    pub input: PathBuf,

    /// Path to the output file (created or overwritten)
    pub output: PathBuf,

    /// Number of lines per chunk [default: 1000000]
    #[arg(long, alias = "chunk_size", value_parser = clap::value_parser!(u64).range(1..))]
    pub chunk_size: Option<u64>,

    /// Path to a JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory in which to create the temporary chunk directory
    #[arg(long)]
    pub temp_dir: Option<PathBuf>,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print run status each time Enter is pressed
    #[arg(long)]
    pub status: bool,

    /// Only log errors
    #[arg(long, short)]
    pub quiet: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
