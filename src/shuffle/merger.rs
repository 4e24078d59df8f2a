//! Merge phase: whole chunks appended to the output in random order
//!
//! Chunks are drawn without replacement, copied byte for byte and deleted.
//! A chunk is never revisited once written. On failure the output may be
//! left partially written; nothing removes it.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use rand::Rng;

use super::chunk::{ChunkHandle, ChunkRegistry};
use super::errors::{ShuffleError, ShuffleResult};
use super::progress::ShuffleProgress;
use crate::observability::{trace_event, Event, Logger, Severity};

/// Totals for a completed merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeStats {
    pub chunks_merged: u64,
    pub lines_written: u64,
    pub bytes_written: u64,
}

/// Appends chunks to an output file
pub struct Merger<'a> {
    progress: &'a ShuffleProgress,
}

impl<'a> Merger<'a> {
    pub fn new(progress: &'a ShuffleProgress) -> Self {
        Self { progress }
    }

    /// Drain `registry` into `output_path`.
    ///
    /// The output is created or truncated even when the registry is empty.
    /// On success the registry is empty and every chunk file is deleted.
    ///
    /// # Errors
    ///
    /// Returns `IoFailure` on any read, write or delete error. Handles not
    /// yet drawn stay in the registry.
    pub fn merge<R: Rng + ?Sized>(
        &self,
        registry: &mut ChunkRegistry,
        output_path: &Path,
        rng: &mut R,
    ) -> ShuffleResult<MergeStats> {
        let file = File::create(output_path)
            .map_err(|e| ShuffleError::io_at_path("Failed to create output", output_path, e))?;
        let mut writer = BufWriter::new(file);
        let mut stats = MergeStats::default();
        self.progress.set_chunks_remaining(registry.len() as u64);

        while let Some(handle) = registry.draw(rng) {
            let copied = append_chunk(&handle, &mut writer)?;
            fs::remove_file(handle.path())
                .map_err(|e| ShuffleError::io_at_path("Failed to remove chunk", handle.path(), e))?;

            stats.chunks_merged += 1;
            stats.lines_written += handle.line_count() as u64;
            stats.bytes_written += copied;
            self.progress.record_chunk_merged(copied);

            if Logger::enabled(Severity::Trace) {
                trace_event(
                    Event::ChunkMerged,
                    &[
                        ("remaining", registry.len().to_string().as_str()),
                        ("sequence", handle.sequence().to_string().as_str()),
                    ],
                );
            }
        }

        let file = writer
            .into_inner()
            .map_err(|e| ShuffleError::io_at_path("Failed to flush output", output_path, e.into_error()))?;
        file.sync_all()
            .map_err(|e| ShuffleError::io_at_path("Failed to fsync output", output_path, e))?;

        Ok(stats)
    }
}

/// Copy one chunk verbatim, returning the number of bytes copied
fn append_chunk<W: Write>(handle: &ChunkHandle, writer: &mut W) -> ShuffleResult<u64> {
    let file = File::open(handle.path())
        .map_err(|e| ShuffleError::io_at_path("Failed to open chunk", handle.path(), e))?;
    let mut reader = BufReader::new(file);

    let copied = io::copy(&mut reader, writer)
        .map_err(|e| ShuffleError::io_at_path("Failed to append chunk", handle.path(), e))?;

    if copied != handle.byte_len() {
        return Err(ShuffleError::io(
            format!(
                "Chunk {} changed size: expected {} bytes, read {}",
                handle.path().display(),
                handle.byte_len(),
                copied
            ),
            io::Error::from(io::ErrorKind::UnexpectedEof),
        ));
    }

    Ok(copied)
}
