//! Shuffle pipeline: temp storage, split, merge, cleanup
//!
//! Sequence:
//! 1. Validate configuration
//! 2. Create the run's temporary chunk directory
//! 3. Split the input into shuffled chunks
//! 4. Merge the chunks into the output in random order
//! 5. Remove the temporary directory
//!
//! The temporary directory is owned by a `TempDir` guard, so it is removed
//! on every exit path, including errors in either phase.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tempfile::TempDir;
use uuid::Uuid;

use super::chunker::Chunker;
use super::config::ShuffleConfig;
use super::errors::{ShuffleError, ShuffleResult};
use super::merger::Merger;
use super::progress::ShuffleProgress;
use crate::observability::{log_event_with_fields, Event, ObservationScope, Timer};

/// Prefix of the per-run temporary directory
pub const TEMP_DIR_PREFIX: &str = ".chunkshuf-";

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShuffleReport {
    pub run_id: Uuid,
    pub input: PathBuf,
    pub output: PathBuf,
    pub chunk_size: usize,
    pub lines: u64,
    pub chunks: u64,
    pub bytes_written: u64,
    pub elapsed_ms: u64,
}

/// Shuffle `input` into `output` using bounded memory.
///
/// Lines within a chunk are uniformly permuted and chunks are emitted in
/// uniformly random order. Two lines from different chunks never end up
/// interleaved, so this is not a uniform permutation of the whole file;
/// smaller chunks give a better mix at the cost of more files.
///
/// # Errors
///
/// - `InvalidConfig` for a zero chunk size or a bad `temp_dir`
/// - `InputNotFound` if `input` is missing
/// - `IoFailure` for any other I/O error
///
/// On a merge failure `output` may be left partially written.
pub fn shuffle_file(
    input: &Path,
    output: &Path,
    config: &ShuffleConfig,
    progress: &ShuffleProgress,
) -> ShuffleResult<ShuffleReport> {
    config.validate()?;

    let run_id = Uuid::new_v4();
    let run_id_str = run_id.to_string();
    let input_str = input.display().to_string();
    let output_str = output.display().to_string();
    let timer = Timer::new();

    let chunk_size_str = config.chunk_size.to_string();
    log_event_with_fields(
        Event::RunStart,
        &[
            ("chunk_size", chunk_size_str.as_str()),
            ("input", input_str.as_str()),
            ("output", output_str.as_str()),
            ("run_id", run_id_str.as_str()),
        ],
    );

    let temp_dir = create_temp_dir(config)?;
    let temp_path_str = temp_dir.path().display().to_string();
    log_event_with_fields(Event::TempDirCreated, &[("path", temp_path_str.as_str())]);

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let split_scope = ObservationScope::with_fields("SPLIT", &[("run_id", run_id_str.as_str())]);
    let chunker = Chunker::new(temp_dir.path(), config.chunk_size, progress)?;
    let mut registry = match chunker.split(input, &mut rng) {
        Ok(registry) => registry,
        Err(e) => {
            split_scope.fail(&e.to_string());
            return Err(e);
        }
    };
    let lines = registry.total_lines();
    let chunks = registry.len() as u64;
    let chunks_str = chunks.to_string();
    let lines_str = lines.to_string();
    split_scope.complete_with_fields(&[
        ("chunks", chunks_str.as_str()),
        ("lines", lines_str.as_str()),
    ]);

    let merge_scope = ObservationScope::with_fields("MERGE", &[("run_id", run_id_str.as_str())]);
    let stats = match Merger::new(progress).merge(&mut registry, output, &mut rng) {
        Ok(stats) => stats,
        Err(e) => {
            merge_scope.fail(&e.to_string());
            return Err(e);
        }
    };
    let bytes_str = stats.bytes_written.to_string();
    merge_scope.complete_with_fields(&[("bytes_written", bytes_str.as_str())]);

    debug_assert!(registry.is_empty());
    debug_assert_eq!(stats.chunks_merged, chunks);

    temp_dir
        .close()
        .map_err(|e| ShuffleError::io("Failed to remove temporary directory", e))?;
    log_event_with_fields(Event::TempDirRemoved, &[("path", temp_path_str.as_str())]);

    let report = ShuffleReport {
        run_id,
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        chunk_size: config.chunk_size,
        lines,
        chunks,
        bytes_written: stats.bytes_written,
        elapsed_ms: timer.elapsed_millis(),
    };

    let elapsed_str = report.elapsed_ms.to_string();
    log_event_with_fields(
        Event::RunComplete,
        &[
            ("elapsed_ms", elapsed_str.as_str()),
            ("run_id", run_id_str.as_str()),
        ],
    );

    Ok(report)
}

fn create_temp_dir(config: &ShuffleConfig) -> ShuffleResult<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(TEMP_DIR_PREFIX);

    match &config.temp_dir {
        Some(parent) => builder.tempdir_in(parent).map_err(|e| {
            ShuffleError::io_at_path("Failed to create temporary directory in", parent, e)
        }),
        None => builder
            .tempdir()
            .map_err(|e| ShuffleError::io("Failed to create temporary directory", e)),
    }
}
